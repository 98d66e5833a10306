pub use axum_test::TestServer;
pub use serde_json::{json, Value};

pub use crate::Database;

/// Builds a test server around the full application router.
pub fn app(pool: Database) -> TestServer {
	let state = crate::State {
		database: pool,
		hasher: argon2::Argon2::default(),
		keys: crate::jwt::Keys::from_secret(b"test-secret"),
	};

	TestServer::new(crate::app(state)).unwrap()
}

/// Registers a user and returns the `{user, token}` payload.
pub async fn register(app: &TestServer, name: &str, email: &str) -> Value {
	let response = app
		.post("/auth/register")
		.json(&json!({
			"name": name,
			"email": email,
			"password": "hunter2hunter",
		}))
		.await;

	assert_eq!(response.status_code(), 201);

	response.json::<Value>()["data"].clone()
}

/// Builds an `Authorization` header value from a bearer token.
pub fn bearer(token: &Value) -> axum::http::HeaderValue {
	format!("Bearer {}", token["token"].as_str().unwrap())
		.parse()
		.unwrap()
}
