use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// The author projection joined onto posts and comments.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub profile_picture: String,
}

/// A comment, with its author joined in.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
	pub id: Uuid,
	pub user: Author,
	pub text: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A single post, fully assembled for the wire: author, the ids of the users
/// who liked it, and its comments in creation order.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: Uuid,
	pub author: Author,
	pub content: String,
	pub likes: Vec<Uuid>,
	pub likes_count: i64,
	pub comments: Vec<Comment>,
	pub comments_count: i64,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A trending post. The author is projected down to display fields only.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingPost {
	pub id: Uuid,
	pub author: TrendingAuthor,
	pub content: String,
	pub likes_count: i64,
	pub comments_count: i64,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingAuthor {
	pub name: String,
	pub email: String,
	pub profile_picture: String,
}

/// The flat row shape of a post joined with its author.
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
	pub id: Uuid,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
	pub author_id: Uuid,
	pub author_name: String,
	pub author_email: String,
	pub author_profile_picture: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
	pub id: Uuid,
	pub post_id: Uuid,
	pub text: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub user_id: Uuid,
	pub user_name: String,
	pub user_email: String,
	pub user_profile_picture: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LikeRow {
	pub post_id: Uuid,
	pub user_id: Uuid,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TrendingRow {
	pub id: Uuid,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub likes_count: i64,
	pub comments_count: i64,
	pub author_name: String,
	pub author_email: String,
	pub author_profile_picture: String,
}

impl From<CommentRow> for Comment {
	fn from(row: CommentRow) -> Self {
		Self {
			id: row.id,
			user: Author {
				id: row.user_id,
				name: row.user_name,
				email: row.user_email,
				profile_picture: row.user_profile_picture,
			},
			text: row.text,
			created_at: row.created_at,
		}
	}
}

impl From<TrendingRow> for TrendingPost {
	fn from(row: TrendingRow) -> Self {
		Self {
			id: row.id,
			author: TrendingAuthor {
				name: row.author_name,
				email: row.author_email,
				profile_picture: row.author_profile_picture,
			},
			content: row.content,
			likes_count: row.likes_count,
			comments_count: row.comments_count,
			created_at: row.created_at,
		}
	}
}

impl Post {
	/// Joins flat post, comment and like rows into wire-shaped posts,
	/// preserving the order of `posts`.
	pub fn assemble(posts: Vec<PostRow>, comments: Vec<CommentRow>, likes: Vec<LikeRow>) -> Vec<Self> {
		let mut comments_by_post: HashMap<Uuid, Vec<Comment>> = HashMap::new();

		for row in comments {
			comments_by_post
				.entry(row.post_id)
				.or_default()
				.push(row.into());
		}

		let mut likes_by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

		for row in likes {
			likes_by_post.entry(row.post_id).or_default().push(row.user_id);
		}

		posts
			.into_iter()
			.map(|row| {
				let comments = comments_by_post.remove(&row.id).unwrap_or_default();
				let likes = likes_by_post.remove(&row.id).unwrap_or_default();

				Self {
					id: row.id,
					author: Author {
						id: row.author_id,
						name: row.author_name,
						email: row.author_email,
						profile_picture: row.author_profile_picture,
					},
					content: row.content,
					likes_count: likes.len() as i64,
					likes,
					comments_count: comments.len() as i64,
					comments,
					created_at: row.created_at,
					updated_at: row.updated_at,
				}
			})
			.collect()
	}
}

/// Post content is 1-1000 characters after trimming.
pub(crate) fn validate_content(content: &str) -> Result<(), ValidationError> {
	let length = content.trim().chars().count();

	if length == 0 {
		return Err(ValidationError::new("post content cannot be empty"));
	}

	if length > 1000 {
		return Err(ValidationError::new(
			"post content cannot exceed 1000 characters",
		));
	}

	Ok(())
}

/// Comment text is 1-500 characters after trimming.
pub(crate) fn validate_comment_text(text: &str) -> Result<(), ValidationError> {
	let length = text.trim().chars().count();

	if length == 0 {
		return Err(ValidationError::new("comment text cannot be empty"));
	}

	if length > 500 {
		return Err(ValidationError::new(
			"comment text cannot exceed 500 characters",
		));
	}

	Ok(())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreatePostInput {
	#[validate(custom(function = "validate_content"))]
	pub content: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdatePostInput {
	#[validate(custom(function = "validate_content"))]
	pub content: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct AddCommentInput {
	#[validate(custom(function = "validate_comment_text"))]
	pub text: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentPathInput {
	pub id: Uuid,
	pub comment_id: Uuid,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostsData {
	pub posts: Vec<Post>,
	pub pagination: crate::route::model::Pagination,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostData {
	pub post: Post,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeData {
	pub post: Post,
	pub is_liked: bool,
	pub likes_count: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentData {
	pub post: Post,
	pub comment: Comment,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TrendingData {
	pub posts: Vec<TrendingPost>,
}

/// A like with its user joined in, for the analytics view.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeEntry {
	pub user: Author,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LikeEntryRow {
	pub user_id: Uuid,
	pub user_name: String,
	pub user_email: String,
	pub user_profile_picture: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LikeEntryRow> for LikeEntry {
	fn from(row: LikeEntryRow) -> Self {
		Self {
			user: Author {
				id: row.user_id,
				name: row.user_name,
				email: row.user_email,
				profile_picture: row.user_profile_picture,
			},
			created_at: row.created_at,
		}
	}
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
	pub likes_per_day: f64,
	pub comments_per_day: f64,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
	pub total_likes: i64,
	pub total_comments: i64,
	pub likes: Vec<LikeEntry>,
	pub comments: Vec<Comment>,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub engagement: Engagement,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AnalyticsData {
	pub analytics: Analytics,
}
