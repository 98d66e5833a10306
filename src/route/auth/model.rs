use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::route::model::validate_name;

/// A single user.
///
/// The password hash and the logout timestamp never leave the server; every
/// other field is part of the public wire shape.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The display name.
	pub name: String,
	/// The user's primary email address, stored lowercased.
	pub email: String,
	/// The hashed password.
	#[serde(skip_serializing)]
	pub password: Vec<u8>,
	/// A short free-form biography.
	pub bio: String,
	/// A URL to the user's profile picture, or an empty string.
	pub profile_picture: String,
	/// Whether the account is active. Deactivated accounts cannot log in
	/// and their content is hidden.
	pub is_active: bool,
	/// The time of the most recent login.
	pub last_login: chrono::DateTime<chrono::Utc>,
	/// The time of the most recent logout, if any. Kept for analytics only.
	#[serde(skip_serializing)]
	pub last_logout: Option<chrono::DateTime<chrono::Utc>>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The time of the last profile update.
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(custom(function = "validate_name"))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 6, max = 128))]
	pub password: String,
	#[validate(length(max = 300))]
	pub bio: Option<String>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordInput {
	#[validate(length(min = 1, max = 128))]
	pub current_password: String,
	#[validate(length(min = 6, max = 128))]
	pub new_password: String,
}

/// The payload returned by register and login.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AuthData {
	pub user: User,
	/// A bearer token to pass in the `Authorization` header.
	pub token: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserData {
	pub user: User,
}
