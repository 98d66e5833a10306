use std::borrow::Cow;

use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const USER: &str = "User";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Mini LinkedIn API")
		.summary("A small social-networking API")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Registration, login and credentials".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Posts, likes and comments".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::USER.into(),
			description: Some("Profiles, search and suggestions".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("A bearer token issued at registration or login".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				success: false,
				message: "error message".into(),
				errors: vec![error::Message {
					content: "error message".into(),
					field: Some("optional field".into()),
					details: Some(Cow::Owned({
						let mut map = error::Map::new();
						map.insert("key".into(), serde_json::json!("value"));
						map
					})),
				}],
			})
		})
}
