use std::borrow::Cow;

use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
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
		.api_route("/search", get_with(search_users, search_users_docs))
		.api_route(
			"/suggested",
			get_with(get_suggested_users, get_suggested_users_docs),
		)
		.api_route("/stats", get_with(get_stats, get_stats_docs))
		.api_route("/profile", put_with(update_profile, update_profile_docs))
		.api_route("/profile/:id", get_with(get_profile, get_profile_docs))
		.api_route("/:id/posts", get_with(get_user_posts, get_user_posts_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownUser(user) => vec![error::Message {
				content: "unknown_user".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("user".into(), json!(user));
					map
				})),
			}],
		}
	}
}

#[cfg(test)]
mod test {
	use axum::http::header;

	use crate::test::*;

	async fn create_post(app: &TestServer, token: &Value, content: &str) {
		let response = app
			.post("/posts")
			.add_header(header::AUTHORIZATION, bearer(token))
			.json(&json!({ "content": content }))
			.await;

		assert_eq!(response.status_code(), 201);
	}

	#[sqlx::test]
	async fn test_profile(pool: Database) {
		let app = app(pool);

		let user = register(&app, "John Smith", "john@smith.com").await;
		let id = user["user"]["id"].as_str().unwrap();

		for i in 0..7 {
			create_post(&app, &user, &format!("post {i}")).await;
		}

		let response = app.get(&format!("/users/profile/{id}")).await;

		assert_eq!(response.status_code(), 200);

		let profile = &response.json::<Value>()["data"]["user"];

		assert_eq!(profile["name"], "John Smith");
		assert_eq!(profile["postsCount"], 7);
		assert_eq!(profile["recentPosts"].as_array().unwrap().len(), 5);
		assert!(profile.get("password").is_none());

		let response = app
			.get(&format!("/users/profile/{}", uuid::Uuid::new_v4()))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_update_profile(pool: Database) {
		let app = app(pool);

		let user = register(&app, "John Smith", "john@smith.com").await;

		let response = app
			.put("/users/profile")
			.add_header(header::AUTHORIZATION, bearer(&user))
			.json(&json!({ "name": "Johnny Smith", "bio": "a new bio" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let updated = &response.json::<Value>()["data"]["user"];

		assert_eq!(updated["name"], "Johnny Smith");
		assert_eq!(updated["bio"], "a new bio");

		let response = app
			.put("/users/profile")
			.add_header(header::AUTHORIZATION, bearer(&user))
			.json(&json!({ "name": "X1" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test]
	async fn test_user_posts(pool: Database) {
		let app = app(pool);

		let user = register(&app, "John Smith", "john@smith.com").await;
		let id = user["user"]["id"].as_str().unwrap();

		create_post(&app, &user, "only one").await;

		let response = app.get(&format!("/users/{id}/posts")).await;
		let body = response.json::<Value>();

		assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 1);
		assert_eq!(body["data"]["pagination"]["total"], 1);

		let response = app
			.get(&format!("/users/{}/posts", uuid::Uuid::new_v4()))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_search(pool: Database) {
		let app = app(pool);

		register(&app, "John Smith", "john@smith.com").await;
		register(&app, "Jane Doe", "jane@doe.com").await;

		let response = app.get("/users/search").add_query_param("q", "jo").await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();
		let users = body["data"]["users"].as_array().unwrap();

		assert_eq!(users.len(), 1);
		assert_eq!(users[0]["name"], "John Smith");

		// Bio matches count too.
		let response = app.get("/users/search").add_query_param("q", "doe.com").await;

		assert_eq!(
			response.json::<Value>()["data"]["users"]
				.as_array()
				.unwrap()
				.len(),
			1
		);

		// Too-short queries are rejected, never answered with an empty page.
		for q in ["j", " j "] {
			let response = app.get("/users/search").add_query_param("q", q).await;

			assert_eq!(response.status_code(), 400);
		}

		// `LIKE` metacharacters are matched literally, so a wildcard query
		// does not match everyone.
		let response = app.get("/users/search").add_query_param("q", "%%").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<Value>()["data"]["users"]
				.as_array()
				.unwrap()
				.len(),
			0
		);

		let response = app
			.get("/users/search")
			.add_query_param("q", "jo")
			.add_query_param("page", i64::MAX)
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test]
	async fn test_suggested(pool: Database) {
		let app = app(pool);

		let busy = register(&app, "John Smith", "john@smith.com").await;
		let quiet = register(&app, "Jane Doe", "jane@doe.com").await;

		register(&app, "Mary Major", "mary@major.com").await;

		for i in 0..3 {
			create_post(&app, &busy, &format!("post {i}")).await;
		}

		create_post(&app, &quiet, "one post").await;

		let response = app.get("/users/suggested").await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();
		let users = body["data"]["users"].as_array().unwrap();

		// Users with no posts in the window are not suggested.
		assert_eq!(users.len(), 2);
		assert_eq!(users[0]["name"], "John Smith");
		assert_eq!(users[0]["postsCount"], 3);
		assert_eq!(users[1]["name"], "Jane Doe");

		let response = app.get("/users/suggested").add_query_param("limit", 1).await;

		assert_eq!(
			response.json::<Value>()["data"]["users"]
				.as_array()
				.unwrap()
				.len(),
			1
		);
	}

	#[sqlx::test]
	async fn test_stats(pool: Database) {
		let app = app(pool);

		let user = register(&app, "John Smith", "john@smith.com").await;
		let fan = register(&app, "Jane Doe", "jane@doe.com").await;

		create_post(&app, &user, "count me").await;

		let response = app.get("/posts").await;
		let id = response.json::<Value>()["data"]["posts"][0]["id"]
			.as_str()
			.unwrap()
			.to_owned();

		app.put(&format!("/posts/{id}/like"))
			.add_header(header::AUTHORIZATION, bearer(&fan))
			.await;
		app.post(&format!("/posts/{id}/comments"))
			.add_header(header::AUTHORIZATION, bearer(&fan))
			.json(&json!({ "text": "nice" }))
			.await;

		let response = app
			.get("/users/stats")
			.add_header(header::AUTHORIZATION, bearer(&user))
			.await;

		assert_eq!(response.status_code(), 200);

		let stats = &response.json::<Value>()["data"]["stats"];

		assert_eq!(stats["postsCount"], 1);
		assert_eq!(stats["totalLikes"], 1);
		assert_eq!(stats["totalComments"], 1);
		assert_eq!(stats["recentPostsCount"], 1);
	}
}
