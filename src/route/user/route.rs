use aide::axum::IntoApiResponse;
use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::{
		auth,
		model::{Envelope, IdInput, Paginate, Pagination},
		post,
	},
	Database,
};

use super::{model, Error, RouteError};

/// Get profile
/// Returns a user's profile with their post count and five most recent posts.
#[route(tag = tag::USER, response(status = 200, description = "The requested profile.", shape = "Json<Envelope<model::ProfileData>>"))]
pub async fn get_profile(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, auth::model::User>(
		r#"SELECT * FROM "user" WHERE id = $1 AND is_active"#,
	)
	.bind(path.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownUser(path.id))?;

	let (recent_posts, posts_count) =
		post::route::fetch_page(&database, Some(user.id), &Paginate { page: 1, limit: 5 })
			.await?;

	Ok(Json(Envelope::data(model::ProfileData {
		user: model::Profile {
			user,
			posts_count,
			recent_posts,
		},
	})))
}

/// Update profile
/// Updates the authenticated user's display fields.
#[route(tag = tag::USER, response(status = 200, description = "Updated successfully.", shape = "Json<Envelope<model::UserData>>"))]
pub async fn update_profile(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::UpdateProfileInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, auth::model::User>(
		r#"
			UPDATE "user"
			SET name = COALESCE($1, name),
				bio = COALESCE($2, bio),
				profile_picture = COALESCE($3, profile_picture),
				updated_at = now()
			WHERE id = $4
			RETURNING *
		"#,
	)
	.bind(input.name.as_deref().map(str::trim))
	.bind(input.bio)
	.bind(input.profile_picture)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	Ok(Json(Envelope::message(
		"Profile updated successfully",
		model::UserData { user },
	)))
}

/// List a user's posts
/// Returns one page of a user's active posts, newest first.
#[route(tag = tag::USER, response(status = 200, description = "One page of posts.", shape = "Json<Envelope<post::model::PostsData>>"))]
pub async fn get_user_posts(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
	Query(paginate): Query<Paginate>,
) -> Result<impl IntoApiResponse, RouteError> {
	let exists = sqlx::query_scalar::<_, bool>(
		r#"SELECT EXISTS (SELECT 1 FROM "user" WHERE id = $1 AND is_active)"#,
	)
	.bind(path.id)
	.fetch_one(&database)
	.await?;

	if !exists {
		return Err(Error::UnknownUser(path.id).into());
	}

	let (posts, total) = post::route::fetch_page(&database, Some(path.id), &paginate).await?;

	Ok(Json(Envelope::data(post::model::PostsData {
		posts,
		pagination: Pagination::new(&paginate, total),
	})))
}

/// Escapes `LIKE` metacharacters so the query text is matched literally.
fn escape_like(query: &str) -> String {
	query
		.replace('\\', "\\\\")
		.replace('%', "\\%")
		.replace('_', "\\_")
}

/// Search users
/// Matches active users by name, email or bio, case-insensitively.
#[route(tag = tag::USER, response(status = 200, description = "One page of matching users.", shape = "Json<Envelope<model::UsersData>>"))]
pub async fn search_users(
	State(database): State<Database>,
	Query(search): Query<model::SearchInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let pattern = format!("%{}%", escape_like(search.q.trim()));
	let paginate = search.paginate();

	let users = sqlx::query_as::<_, model::PublicUser>(
		r#"
			SELECT id, name, email, bio, profile_picture, created_at
			FROM "user"
			WHERE is_active AND (name ILIKE $1 OR email ILIKE $1 OR bio ILIKE $1)
			ORDER BY name
			LIMIT $2 OFFSET $3
		"#,
	)
	.bind(&pattern)
	.bind(paginate.limit)
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	let total = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT count(*) FROM "user"
			WHERE is_active AND (name ILIKE $1 OR email ILIKE $1 OR bio ILIKE $1)
		"#,
	)
	.bind(&pattern)
	.fetch_one(&database)
	.await?;

	Ok(Json(Envelope::data(model::UsersData {
		users,
		pagination: Pagination::new(&paginate, total),
	})))
}

/// Suggested users
/// Returns active users who posted in the last week, most active first.
#[route(tag = tag::USER, response(status = 200, description = "The suggested users.", shape = "Json<Envelope<model::SuggestedData>>"))]
pub async fn get_suggested_users(
	State(database): State<Database>,
	Query(input): Query<model::SuggestedInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let users = sqlx::query_as::<_, model::SuggestedUser>(
		r#"
			SELECT u.id, u.name, u.email, u.bio, u.profile_picture, u.created_at,
				count(*) AS posts_count
			FROM "user" u
			JOIN post p ON p.author_id = u.id
				AND p.is_active
				AND p.created_at > now() - interval '7 days'
			WHERE u.is_active
			GROUP BY u.id
			ORDER BY posts_count DESC, u.created_at DESC
			LIMIT $1
		"#,
	)
	.bind(input.limit)
	.fetch_all(&database)
	.await?;

	Ok(Json(Envelope::data(model::SuggestedData { users })))
}

/// Account stats
/// Returns posting and engagement totals for the authenticated user.
#[route(tag = tag::USER, response(status = 200, description = "The account stats.", shape = "Json<Envelope<model::StatsData>>"))]
pub async fn get_stats(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	let posts_count = sqlx::query_scalar::<_, i64>(
		"SELECT count(*) FROM post WHERE author_id = $1 AND is_active",
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	let total_likes = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT count(*) FROM post_like l
			JOIN post p ON p.id = l.post_id
			WHERE p.author_id = $1 AND p.is_active
		"#,
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	let total_comments = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT count(*) FROM comment c
			JOIN post p ON p.id = c.post_id
			WHERE p.author_id = $1 AND p.is_active
		"#,
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	let recent_posts_count = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT count(*) FROM post
			WHERE author_id = $1 AND is_active
				AND created_at > now() - interval '30 days'
		"#,
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	Ok(Json(Envelope::data(model::StatsData {
		stats: model::Stats {
			posts_count,
			total_likes,
			total_comments,
			recent_posts_count,
			joined_date: session.user.created_at,
		},
	})))
}

#[cfg(test)]
mod test {
	use super::escape_like;

	#[test]
	fn test_escape_like() {
		assert_eq!(escape_like("jo"), "jo");
		assert_eq!(escape_like("%%"), "\\%\\%");
		assert_eq!(escape_like("a_b"), "a\\_b");
		assert_eq!(escape_like("a\\b"), "a\\\\b");
	}
}
