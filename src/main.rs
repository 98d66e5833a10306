#![warn(clippy::pedantic)]

mod error;
mod extract;
mod jwt;
mod openapi;
mod ratelimit;
mod route;
#[cfg(test)]
mod test;
mod trace;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the database pool, the hash configuration (if it's expensive to
/// create), or the token keys.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub keys: jwt::Keys,
}

/// Builds the application router and its OpenAPI document.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/posts", route::post::routes())
		.nest("/users", route::user::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	router
		.layer(
			ServiceBuilder::new()
				.layer(Extension(Arc::new(api)))
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() {
	let _guard = trace::init_tracing_subscriber();
	dotenvy::dotenv().ok();

	let state = State {
		database: Database::connect(
			&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
		)
		.await
		.expect("failed to connect to database"),
		hasher: Argon2::default(),
		keys: jwt::Keys::from_secret(
			std::env::var("JWT_SECRET")
				.expect("JWT_SECRET must be set")
				.as_bytes(),
		),
	};

	sqlx::migrate!()
		.run(&state.database)
		.await
		.expect("failed to run migrations");

	let ratelimit = ratelimit::default();
	ratelimit::cleanup_old_limits(&[&ratelimit]);

	let app = app(state).layer(GovernorLayer { config: ratelimit });

	let port = std::env::var("PORT").map_or_else(
		|_| 3000,
		|port| port.parse().expect("PORT must be a number"),
	);

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
	)
	.await
	.unwrap();
}
