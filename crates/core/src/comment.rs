//! Comment record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Blog, BlogId, CommentId, Entity, User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub blog_id: BlogId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_image: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(blog: &Blog, author: &User, content: &str) -> Self {
        Self {
            id: CommentId::new(),
            blog_id: blog.id,
            user_id: author.id,
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            content: content.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
