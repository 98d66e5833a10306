use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::RouteError, jwt, openapi::SECURITY_SCHEME_BEARER, route::auth, Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the authenticated user from an `Authorization: Bearer` header.
///
/// Requests without a token are rejected with [`auth::Error::NoAuthToken`].
/// Malformed or expired tokens, tokens bound to unknown users, and tokens
/// bound to deactivated accounts are all rejected with
/// [`auth::Error::InvalidAuthToken`].
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user: auth::model::User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	jwt::Keys: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.ok_or(auth::Error::NoAuthToken)?;

		let token = header
			.strip_prefix(AUTHORIZATION_PREFIX)
			.ok_or(auth::Error::InvalidAuthToken)?;

		let claims = jwt::Keys::from_ref(state)
			.verify(token)
			.map_err(|_| auth::Error::InvalidAuthToken)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, auth::model::User>(
			r#"SELECT * FROM "user" WHERE id = $1 AND is_active"#,
		)
		.bind(claims.sub)
		.fetch_optional(&database)
		.await?;

		let user = user.ok_or(auth::Error::InvalidAuthToken)?;

		Ok(Self { user })
	}
}

impl OperationInput for Session {
	/// Adds the bearer-token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
