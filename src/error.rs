use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single client-facing error message, optionally tied to an input field.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'e> {
	pub content: Cow<'e, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'e, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'e, Map>>,
}

/// The `{success: false, ...}` body every failed request resolves to.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'e> {
	pub success: bool,
	pub message: Cow<'e, str>,
	pub errors: Vec<Message<'e>>,
}

/// Maps an error to the status code and messages presented to the client.
///
/// The [`std::fmt::Display`] output is used as the top-level message, so it
/// must not contain sensitive information.
pub trait ErrorShape: std::fmt::Display {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;

	fn response(&self) -> Response<Body> {
		(
			self.status(),
			Json(ErrorResponse {
				success: false,
				message: self.to_string().into(),
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

/// Errors that can occur in any route: input rejection, validation,
/// or a database fault.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error")]
	Validation(#[from] validator::ValidationErrors),
	#[error("malformed json body")]
	Json(axum_jsonschema::JsonSchemaRejection),
	#[error("malformed query string: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("malformed path parameter: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl From<axum_jsonschema::JsonSchemaRejection> for AppError {
	fn from(rejection: axum_jsonschema::JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| Message {
						content: error
							.message
							.clone()
							.unwrap_or_else(|| error.code.clone()),
						field: Some(Cow::Borrowed(field)),
						details: None,
					})
				})
				.collect(),
			Self::Json(..) | Self::Query(..) | Self::Path(..) => vec![Message {
				content: self.to_string().into(),
				field: None,
				details: None,
			}],
			// Database detail is only exposed in development builds.
			Self::Database(error) => vec![Message {
				content: if cfg!(debug_assertions) {
					error.to_string().into()
				} else {
					"internal server error".into()
				},
				field: None,
				details: None,
			}],
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		self.response()
	}
}

/// Error type for a route, joining the route's own error enum with the
/// app-wide [`AppError`].
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E> {
	#[error(transparent)]
	Route(E),
	#[error(transparent)]
	App(#[from] AppError),
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Route(error) => error.response(),
			Self::App(error) => error.response(),
		}
	}
}

impl<E> aide::OperationOutput for RouteError<E> {
	type Inner = Self;
}
