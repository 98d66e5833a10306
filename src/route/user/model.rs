use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::{
	auth,
	model::{one, ten, validate_name, Paginate, Pagination},
	post,
};

/// The public projection of a user, as returned by search.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub bio: String,
	pub profile_picture: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A suggested user, ranked by recent posting activity.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedUser {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub bio: String,
	pub profile_picture: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// Active posts in the trailing seven days.
	pub posts_count: i64,
}

/// A full profile page: the user plus their posting activity.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	#[serde(flatten)]
	pub user: auth::model::User,
	pub posts_count: i64,
	pub recent_posts: Vec<post::model::Post>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
	#[validate(custom(function = "validate_name"))]
	pub name: Option<String>,
	#[validate(length(max = 300))]
	pub bio: Option<String>,
	#[validate(length(max = 500))]
	pub profile_picture: Option<String>,
}

/// Search queries are at least two characters after trimming.
pub(crate) fn validate_query(query: &str) -> Result<(), ValidationError> {
	if query.trim().chars().count() < 2 {
		return Err(ValidationError::new(
			"search query must be at least 2 characters",
		));
	}

	Ok(())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// The text to match against names, emails and bios.
	#[validate(custom(function = "validate_query"))]
	pub q: String,
	#[validate(range(min = 1, max = 100_000))]
	#[serde(default = "one")]
	pub page: i64,
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub limit: i64,
}

impl SearchInput {
	pub fn paginate(&self) -> Paginate {
		Paginate {
			page: self.page,
			limit: self.limit,
		}
	}
}

/// See [`crate::route::model::one`].
#[inline]
fn five() -> i64 {
	5
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SuggestedInput {
	/// The maximum number of users to suggest.
	#[validate(range(min = 1, max = 20))]
	#[serde(default = "five")]
	pub limit: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfileData {
	pub user: Profile,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserData {
	pub user: auth::model::User,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UsersData {
	pub users: Vec<PublicUser>,
	pub pagination: Pagination,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SuggestedData {
	pub users: Vec<SuggestedUser>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
	pub posts_count: i64,
	pub total_likes: i64,
	pub total_comments: i64,
	/// Posts created in the trailing 30 days.
	pub recent_posts_count: i64,
	pub joined_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct StatsData {
	pub stats: Stats,
}

#[cfg(test)]
mod test {
	use super::validate_query;

	#[test]
	fn test_validate_query() {
		assert!(validate_query("jo").is_ok());
		assert!(validate_query("j").is_err());
		assert!(validate_query(" j ").is_err());
		assert!(validate_query("  ").is_err());
	}
}
