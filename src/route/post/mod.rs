use std::borrow::Cow;

use aide::axum::{
	routing::{get_with, post_with, put_with},
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
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("unknown comment {0}")]
	UnknownComment(Uuid),
	#[error("only the author can modify this post")]
	NotPostAuthor,
	#[error("only the author can remove this comment")]
	NotCommentAuthor,
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
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/feed", get_with(get_feed, get_feed_docs))
		.api_route("/trending", get_with(get_trending, get_trending_docs))
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route("/:id/like", put_with(toggle_like, toggle_like_docs))
		.api_route("/:id/analytics", get_with(get_analytics, get_analytics_docs))
		.api_route("/:id/comments", post_with(add_comment, add_comment_docs))
		.api_route(
			"/:id/comments/:comment_id",
			aide::axum::routing::delete_with(remove_comment, remove_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownComment(..) => StatusCode::NOT_FOUND,
			Self::NotPostAuthor | Self::NotCommentAuthor => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => vec![error::Message {
				content: "unknown_post".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("post".into(), json!(post));
					map
				})),
			}],
			Self::UnknownComment(comment) => vec![error::Message {
				content: "unknown_comment".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("comment".into(), json!(comment));
					map
				})),
			}],
			Self::NotPostAuthor | Self::NotCommentAuthor => vec![error::Message {
				content: self.to_string().into(),
				field: None,
				details: None,
			}],
		}
	}
}
