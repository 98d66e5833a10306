use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{extract::State, http::StatusCode};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Session},
	openapi::tag,
	route::model::{Ack, Envelope},
	AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Register account
/// Registers a new account, returning the created user and a bearer token.
#[route(tag = tag::AUTH, response(status = 201, description = "Registered successfully.", shape = "Json<Envelope<model::AuthData>>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let email = auth.email.trim().to_lowercase();

	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let user = sqlx::query_as::<_, model::User>(
		r#"
			INSERT INTO "user" (id, name, email, password, bio)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *
		"#,
	)
	.bind(user_id)
	.bind(auth.name.trim())
	.bind(&email)
	.bind(&hashed[..])
	.bind(auth.bio.as_deref().unwrap_or_default())
	.fetch_one(&state.database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.constraint() == Some("user_email_key") => {
			Error::EmailTaken.into()
		}
		e => RouteError::from(e),
	})?;

	let token = state.keys.issue(user.id).map_err(Error::Token)?;

	Ok((
		StatusCode::CREATED,
		Json(Envelope::message(
			"User registered successfully",
			model::AuthData { user, token },
		)),
	))
}

/// Log in
/// Logs in to an account, returning the user and a fresh bearer token.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<Envelope<model::AuthData>>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(auth.email.trim().to_lowercase())
		.fetch_optional(&state.database)
		.await?;

	let Some(user) = user else {
		return Err(Error::InvalidEmailOrPassword.into());
	};

	if !user.is_active {
		return Err(Error::AccountDeactivated.into());
	}

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidEmailOrPassword.into());
	}

	let user = sqlx::query_as::<_, model::User>(
		r#"UPDATE "user" SET last_login = now() WHERE id = $1 RETURNING *"#,
	)
	.bind(user.id)
	.fetch_one(&state.database)
	.await?;

	let token = state.keys.issue(user.id).map_err(Error::Token)?;

	Ok(Json(Envelope::message(
		"Login successful",
		model::AuthData { user, token },
	)))
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<Envelope<model::UserData>> {
	Json(Envelope::data(model::UserData {
		user: session.user,
	}))
}

/// Log out
/// Records the logout time. Issued tokens stay valid until they expire.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query(r#"UPDATE "user" SET last_logout = now() WHERE id = $1"#)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	Ok(Json(Ack::message("Logged out successfully")))
}

/// Change password
/// Replaces the password after verifying the current one.
#[route(tag = tag::AUTH, response(status = 200, description = "Password updated successfully."))]
pub async fn update_password(
	State(state): State<AppState>,
	session: Session,
	Json(input): Json<model::UpdatePasswordInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let current =
		hash_password(&state.hasher, &input.current_password, &session.user.id)
			.map_err(Error::Argon)?;

	if session.user.password != current {
		return Err(Error::IncorrectPassword.into());
	}

	let hashed = hash_password(&state.hasher, &input.new_password, &session.user.id)
		.map_err(Error::Argon)?;

	sqlx::query(r#"UPDATE "user" SET password = $1, updated_at = now() WHERE id = $2"#)
		.bind(&hashed[..])
		.bind(session.user.id)
		.execute(&state.database)
		.await?;

	Ok(Json(Ack::message("Password updated successfully")))
}
