//! Record storage abstraction for users, blog posts and comments.
//!
//! Handlers only see [`Repository`]; the process picks an implementation at
//! startup ([`InMemoryRepository`] for tests/dev, [`PgRepository`] for Postgres).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use myblog_core::{Blog, Comment, Entity, User};

pub mod in_memory;
pub mod postgres;
pub mod query;

pub use in_memory::InMemoryRepository;
pub use postgres::{PgRecord, PgRepository};
pub use query::{Filter, Order, Query, Window};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation error.
///
/// These are **infrastructure errors**, as opposed to the API errors handlers
/// report to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A storable record.
pub trait Record: Entity + Clone + Send + Sync + 'static {
    /// Record kind, used in errors and logs.
    const KIND: &'static str;

    /// Text value of a column, for equality filters.
    fn column(&self, name: &str) -> Option<String>;
}

impl Record for User {
    const KIND: &'static str = "user";

    fn column(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "email" => Some(self.email.clone()),
            "name" => Some(self.name.clone()),
            "admin" => Some(self.admin.to_string()),
            _ => None,
        }
    }
}

impl Record for Blog {
    const KIND: &'static str = "blog";

    fn column(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "user_id" => Some(self.user_id.to_string()),
            "name" => Some(self.name.clone()),
            _ => None,
        }
    }
}

impl Record for Comment {
    const KIND: &'static str = "comment";

    fn column(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "blog_id" => Some(self.blog_id.to_string()),
            "user_id" => Some(self.user_id.to_string()),
            _ => None,
        }
    }
}

/// CRUD + listing over one record kind.
///
/// Implementations must:
/// - fail `save` with [`StoreError::Conflict`] if the id already exists
/// - fail `update`/`remove` with [`StoreError::NotFound`] if it does not
/// - order listings by creation time as requested, then apply the window
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn find(&self, id: &T::Id) -> StoreResult<Option<T>>;

    async fn find_all(&self, query: &Query) -> StoreResult<Vec<T>>;

    async fn count(&self, filter: &Filter) -> StoreResult<u64>;

    async fn save(&self, record: &T) -> StoreResult<()>;

    async fn update(&self, record: &T) -> StoreResult<()>;

    async fn remove(&self, id: &T::Id) -> StoreResult<()>;
}

#[async_trait]
impl<T, S> Repository<T> for Arc<S>
where
    T: Record,
    S: Repository<T> + ?Sized,
{
    async fn find(&self, id: &T::Id) -> StoreResult<Option<T>> {
        (**self).find(id).await
    }

    async fn find_all(&self, query: &Query) -> StoreResult<Vec<T>> {
        (**self).find_all(query).await
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        (**self).count(filter).await
    }

    async fn save(&self, record: &T) -> StoreResult<()> {
        (**self).save(record).await
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        (**self).update(record).await
    }

    async fn remove(&self, id: &T::Id) -> StoreResult<()> {
        (**self).remove(id).await
    }
}
