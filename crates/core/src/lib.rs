//! `myblog-core` — blog domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! record types, identifiers, the API error family and pagination math.

pub mod blog;
pub mod comment;
pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod text;
pub mod user;

pub use blog::Blog;
pub use comment::Comment;
pub use entity::Entity;
pub use error::{ApiError, ApiErrorBody};
pub use id::{BlogId, CommentId, UserId};
pub use pagination::{Page, page_index};
pub use text::text_to_html;
pub use user::User;
