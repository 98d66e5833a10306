use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::model::{Ack, Envelope, IdInput, Paginate, Pagination},
	Database,
};

use super::{model, Error, RouteError};

/// Fetches one page of active posts, newest first, optionally filtered to a
/// single author. Returns the assembled posts and the total row count.
pub(crate) async fn fetch_page(
	database: &Database,
	author: Option<Uuid>,
	paginate: &Paginate,
) -> Result<(Vec<model::Post>, i64), sqlx::Error> {
	let posts = sqlx::query_as::<_, model::PostRow>(
		r#"
			SELECT p.id, p.content, p.created_at, p.updated_at,
				u.id AS author_id, u.name AS author_name,
				u.email AS author_email, u.profile_picture AS author_profile_picture
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			WHERE p.is_active AND ($1::uuid IS NULL OR p.author_id = $1)
			ORDER BY p.created_at DESC
			LIMIT $2 OFFSET $3
		"#,
	)
	.bind(author)
	.bind(paginate.limit)
	.bind(paginate.offset())
	.fetch_all(database)
	.await?;

	let total = sqlx::query_scalar::<_, i64>(
		"SELECT count(*) FROM post WHERE is_active AND ($1::uuid IS NULL OR author_id = $1)",
	)
	.bind(author)
	.fetch_one(database)
	.await?;

	let ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
	let (comments, likes) = join_engagement(database, &ids).await?;

	Ok((model::Post::assemble(posts, comments, likes), total))
}

/// Fetches the comments and likes of the given posts, in creation order.
async fn join_engagement(
	database: &Database,
	ids: &[Uuid],
) -> Result<(Vec<model::CommentRow>, Vec<model::LikeRow>), sqlx::Error> {
	let comments = sqlx::query_as::<_, model::CommentRow>(
		r#"
			SELECT c.id, c.post_id, c.text, c.created_at,
				u.id AS user_id, u.name AS user_name,
				u.email AS user_email, u.profile_picture AS user_profile_picture
			FROM comment c
			JOIN "user" u ON u.id = c.user_id
			WHERE c.post_id = ANY($1)
			ORDER BY c.created_at
		"#,
	)
	.bind(ids)
	.fetch_all(database)
	.await?;

	let likes = sqlx::query_as::<_, model::LikeRow>(
		"SELECT post_id, user_id FROM post_like WHERE post_id = ANY($1) ORDER BY created_at",
	)
	.bind(ids)
	.fetch_all(database)
	.await?;

	Ok((comments, likes))
}

/// Fetches a single active post, fully assembled.
pub(crate) async fn fetch_post(
	database: &Database,
	id: Uuid,
) -> Result<Option<model::Post>, sqlx::Error> {
	let post = sqlx::query_as::<_, model::PostRow>(
		r#"
			SELECT p.id, p.content, p.created_at, p.updated_at,
				u.id AS author_id, u.name AS author_name,
				u.email AS author_email, u.profile_picture AS author_profile_picture
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			WHERE p.id = $1 AND p.is_active
		"#,
	)
	.bind(id)
	.fetch_optional(database)
	.await?;

	let Some(post) = post else {
		return Ok(None);
	};

	let (comments, likes) = join_engagement(database, &[post.id]).await?;

	Ok(model::Post::assemble(vec![post], comments, likes).pop())
}

/// Checks that a post exists and is active, returning its author.
async fn fetch_author(database: &Database, id: Uuid) -> Result<Uuid, RouteError> {
	sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM post WHERE id = $1 AND is_active")
		.bind(id)
		.fetch_optional(database)
		.await?
		.ok_or_else(|| Error::UnknownPost(id).into())
}

/// List posts
/// Returns one page of active posts, newest first.
#[route(tag = tag::POST, response(status = 200, description = "One page of posts.", shape = "Json<Envelope<model::PostsData>>"))]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<Paginate>,
) -> Result<impl IntoApiResponse, RouteError> {
	let (posts, total) = fetch_page(&database, None, &paginate).await?;

	Ok(Json(Envelope::data(model::PostsData {
		posts,
		pagination: Pagination::new(&paginate, total),
	})))
}

/// Personal feed
/// Returns the post feed for the authenticated user, newest first.
#[route(tag = tag::POST, response(status = 200, description = "One page of posts.", shape = "Json<Envelope<model::PostsData>>"))]
pub async fn get_feed(
	State(database): State<Database>,
	_session: Session,
	Query(paginate): Query<Paginate>,
) -> Result<impl IntoApiResponse, RouteError> {
	let (posts, total) = fetch_page(&database, None, &paginate).await?;

	Ok(Json(Envelope::data(model::PostsData {
		posts,
		pagination: Pagination::new(&paginate, total),
	})))
}

/// Trending posts
/// Returns the ten most engaged-with posts of the trailing 24 hours.
#[route(tag = tag::POST, response(status = 200, description = "The trending posts.", shape = "Json<Envelope<model::TrendingData>>"))]
pub async fn get_trending(
	State(database): State<Database>,
) -> Result<impl IntoApiResponse, RouteError> {
	let posts = sqlx::query_as::<_, model::TrendingRow>(
		r#"
			SELECT p.id, p.content, p.created_at,
				(SELECT count(*) FROM post_like l WHERE l.post_id = p.id) AS likes_count,
				(SELECT count(*) FROM comment c WHERE c.post_id = p.id) AS comments_count,
				u.name AS author_name, u.email AS author_email,
				u.profile_picture AS author_profile_picture
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			WHERE p.is_active AND p.created_at > now() - interval '24 hours'
			ORDER BY likes_count DESC, comments_count DESC, p.created_at DESC
			LIMIT 10
		"#,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(Envelope::data(model::TrendingData {
		posts: posts.into_iter().map(Into::into).collect(),
	})))
}

/// Get post
/// Returns a single post with its comments and likes.
#[route(tag = tag::POST, response(status = 200, description = "The requested post.", shape = "Json<Envelope<model::PostData>>"))]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(Envelope::data(model::PostData { post })))
}

/// Create post
/// Creates a new post authored by the authenticated user.
#[route(tag = tag::POST, response(status = 201, description = "Created successfully.", shape = "Json<Envelope<model::PostData>>"))]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let id = sqlx::query_scalar::<_, Uuid>(
		"INSERT INTO post (author_id, content) VALUES ($1, $2) RETURNING id",
	)
	.bind(session.user.id)
	.bind(input.content.trim())
	.fetch_one(&database)
	.await?;

	let post = fetch_post(&database, id).await?.ok_or(Error::UnknownPost(id))?;

	Ok((
		StatusCode::CREATED,
		Json(Envelope::message(
			"Post created successfully",
			model::PostData { post },
		)),
	))
}

/// Update post
/// Replaces the content of a post. Only the author may do this.
#[route(tag = tag::POST, response(status = 200, description = "Updated successfully.", shape = "Json<Envelope<model::PostData>>"))]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	// Existence is checked before ownership, so an unknown id is a 404 even
	// for non-authors.
	let author = fetch_author(&database, path.id).await?;

	if author != session.user.id {
		return Err(Error::NotPostAuthor.into());
	}

	sqlx::query("UPDATE post SET content = $1, updated_at = now() WHERE id = $2")
		.bind(input.content.trim())
		.bind(path.id)
		.execute(&database)
		.await?;

	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(Envelope::message(
		"Post updated successfully",
		model::PostData { post },
	)))
}

/// Delete post
/// Soft-deletes a post. Only the author may do this.
#[route(tag = tag::POST, response(status = 200, description = "Deleted successfully.", shape = "Json<Ack>"))]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let author = fetch_author(&database, path.id).await?;

	if author != session.user.id {
		return Err(Error::NotPostAuthor.into());
	}

	sqlx::query("UPDATE post SET is_active = false, updated_at = now() WHERE id = $1")
		.bind(path.id)
		.execute(&database)
		.await?;

	Ok(Json(Ack::message("Post deleted successfully")))
}

/// Toggle like
/// Likes the post, or removes the like if one is already present.
#[route(tag = tag::POST, response(status = 200, description = "Like toggled.", shape = "Json<Envelope<model::LikeData>>"))]
pub async fn toggle_like(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	fetch_author(&database, path.id).await?;

	let removed = sqlx::query("DELETE FROM post_like WHERE post_id = $1 AND user_id = $2")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?
		.rows_affected();

	// The composite primary key makes the insert a no-op if another toggle
	// raced us, so the row count never exceeds one per user.
	let is_liked = removed == 0;

	if is_liked {
		sqlx::query(
			"INSERT INTO post_like (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
		)
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?;
	}

	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(Envelope::message(
		if is_liked {
			"Post liked successfully"
		} else {
			"Post unliked successfully"
		},
		model::LikeData {
			likes_count: post.likes_count,
			post,
			is_liked,
		},
	)))
}

/// Add comment
/// Adds a comment to a post.
#[route(tag = tag::POST, response(status = 201, description = "Comment added.", shape = "Json<Envelope<model::CommentData>>"))]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
	Json(input): Json<model::AddCommentInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	fetch_author(&database, path.id).await?;

	let comment_id = sqlx::query_scalar::<_, Uuid>(
		"INSERT INTO comment (post_id, user_id, text) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(path.id)
	.bind(session.user.id)
	.bind(input.text.trim())
	.fetch_one(&database)
	.await?;

	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;
	let comment = post
		.comments
		.iter()
		.find(|comment| comment.id == comment_id)
		.cloned()
		.ok_or(Error::UnknownComment(comment_id))?;

	Ok((
		StatusCode::CREATED,
		Json(Envelope::message(
			"Comment added successfully",
			model::CommentData { post, comment },
		)),
	))
}

/// Remove comment
/// Removes a comment from a post. Only the comment's author may do this.
#[route(tag = tag::POST, response(status = 200, description = "Comment removed.", shape = "Json<Envelope<model::PostData>>"))]
pub async fn remove_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPathInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	fetch_author(&database, path.id).await?;

	// A comment attached to a different post is a 404, not a 403.
	let commenter = sqlx::query_scalar::<_, Uuid>(
		"SELECT user_id FROM comment WHERE id = $1 AND post_id = $2",
	)
	.bind(path.comment_id)
	.bind(path.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownComment(path.comment_id))?;

	if commenter != session.user.id {
		return Err(Error::NotCommentAuthor.into());
	}

	sqlx::query("DELETE FROM comment WHERE id = $1")
		.bind(path.comment_id)
		.execute(&database)
		.await?;

	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(Envelope::message(
		"Comment deleted successfully",
		model::PostData { post },
	)))
}

/// Post analytics
/// Returns engagement figures for a post. Only the author may see them.
#[route(tag = tag::POST, response(status = 200, description = "The post analytics.", shape = "Json<Envelope<model::AnalyticsData>>"))]
pub async fn get_analytics(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let author = fetch_author(&database, path.id).await?;

	if author != session.user.id {
		return Err(Error::NotPostAuthor.into());
	}

	let created_at = sqlx::query_scalar::<_, chrono::DateTime<chrono::Utc>>(
		"SELECT created_at FROM post WHERE id = $1",
	)
	.bind(path.id)
	.fetch_one(&database)
	.await?;

	let likes = sqlx::query_as::<_, model::LikeEntryRow>(
		r#"
			SELECT l.created_at,
				u.id AS user_id, u.name AS user_name,
				u.email AS user_email, u.profile_picture AS user_profile_picture
			FROM post_like l
			JOIN "user" u ON u.id = l.user_id
			WHERE l.post_id = $1
			ORDER BY l.created_at
		"#,
	)
	.bind(path.id)
	.fetch_all(&database)
	.await?;

	let (comments, _) = join_engagement(&database, &[path.id]).await?;
	let comments = comments
		.into_iter()
		.map(model::Comment::from)
		.collect::<Vec<_>>();

	// A post younger than a day counts as one day old, so the rates never
	// divide by zero.
	let days = ((chrono::Utc::now() - created_at).num_seconds() as f64 / 86_400.0)
		.ceil()
		.max(1.0);

	let analytics = model::Analytics {
		total_likes: likes.len() as i64,
		total_comments: comments.len() as i64,
		engagement: model::Engagement {
			likes_per_day: likes.len() as f64 / days,
			comments_per_day: comments.len() as f64 / days,
		},
		likes: likes.into_iter().map(Into::into).collect(),
		comments,
		created_at,
	};

	Ok(Json(Envelope::data(model::AnalyticsData { analytics })))
}
