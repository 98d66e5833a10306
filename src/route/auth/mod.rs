use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not
/// contain sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("account is deactivated")]
	AccountDeactivated,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("no authorization token")]
	NoAuthToken,
	#[error("invalid or expired authorization token")]
	InvalidAuthToken,
	#[error("a user already exists with this email")]
	EmailTaken,
	#[error("current password is incorrect")]
	IncorrectPassword,
	#[error("token issuance error")]
	Token(#[from] jsonwebtoken::errors::Error),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/register", post_with(register, register_docs))
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", post_with(logout, logout_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
		.api_route("/password", put_with(update_password, update_password_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword
			| Self::AccountDeactivated
			| Self::NoAuthToken
			| Self::InvalidAuthToken => StatusCode::UNAUTHORIZED,
			// Duplicate email and password mismatch are client errors, not
			// conflicts, per the original API contract.
			Self::EmailTaken | Self::IncorrectPassword => StatusCode::BAD_REQUEST,
			Self::Argon(..) | Self::Token(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		vec![error::Message {
			content: self.to_string().into(),
			field: None,
			details: None,
		}]
	}
}

#[cfg(test)]
mod test {
	use axum::http::header;

	use crate::test::*;

	#[sqlx::test]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/auth/register")
			.json(&json!({
				"name": "John Smith",
				"email": "John@Smith.com",
				"password": "hunter2hunter",
				"bio": "a bio",
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		let body = response.json::<Value>();

		assert_eq!(body["success"], true);
		assert_eq!(body["data"]["user"]["name"], "John Smith");
		// The email is stored lowercased and the credential is never
		// serialized.
		assert_eq!(body["data"]["user"]["email"], "john@smith.com");
		assert!(body["data"]["user"].get("password").is_none());
		assert!(!body["data"]["token"].as_str().unwrap().is_empty());

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let token = response.json::<Value>()["data"].clone();

		let response = app
			.get("/auth/me")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["data"]["user"]["name"], "John Smith");
	}

	#[sqlx::test]
	async fn test_register_duplicate_email(pool: Database) {
		let app = app(pool);

		register(&app, "John Smith", "john@smith.com").await;

		let response = app
			.post("/auth/register")
			.json(&json!({
				"name": "Second John",
				"email": "JOHN@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["success"], false);
	}

	#[sqlx::test]
	async fn test_register_validation(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/auth/register")
			.json(&json!({
				"name": "John3",
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.post("/auth/register")
			.json(&json!({
				"name": "John Smith",
				"email": "john@smith.com",
				"password": "short",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test]
	async fn test_login_wrong_password(pool: Database) {
		let app = app(pool);

		register(&app, "John Smith", "john@smith.com").await;

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "wrongwrongwrong",
			}))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "nobody@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_me_requires_token(pool: Database) {
		let app = app(pool);

		let response = app.get("/auth/me").await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_password_update_flow(pool: Database) {
		let app = app(pool);

		let token = register(&app, "John Smith", "john@smith.com").await;

		let response = app
			.put("/auth/password")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.json(&json!({
				"currentPassword": "wrongwrongwrong",
				"newPassword": "correcthorse",
			}))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.put("/auth/password")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.json(&json!({
				"currentPassword": "hunter2hunter",
				"newPassword": "correcthorse",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "correcthorse",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_logout_records_timestamp(pool: Database) {
		let app = app(pool.clone());

		let token = register(&app, "John Smith", "john@smith.com").await;

		let response = app
			.post("/auth/logout")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);

		let last_logout = sqlx::query_scalar::<_, Option<chrono::DateTime<chrono::Utc>>>(
			r#"SELECT last_logout FROM "user" WHERE email = $1"#,
		)
		.bind("john@smith.com")
		.fetch_one(&pool)
		.await
		.unwrap();

		assert!(last_logout.is_some());
	}
}
