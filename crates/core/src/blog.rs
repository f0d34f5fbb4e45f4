//! Blog post record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BlogId, Entity, User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    /// New post authored by `author`; text fields are trimmed.
    pub fn new(author: &User, name: &str, summary: &str, content: &str) -> Self {
        Self {
            id: BlogId::new(),
            user_id: author.id,
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            name: name.trim().to_string(),
            summary: summary.trim().to_string(),
            content: content.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Blog {
    type Id = BlogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
