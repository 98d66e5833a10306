pub mod auth;
pub mod docs;
pub mod model;
pub mod post;
pub mod user;
