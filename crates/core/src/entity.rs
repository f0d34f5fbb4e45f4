//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
///
/// Every persisted blog record (users, posts, comments) is an entity: it has a
/// stable identifier and a creation timestamp that listings are ordered by.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// When the record was first created.
    fn created_at(&self) -> DateTime<Utc>;
}
