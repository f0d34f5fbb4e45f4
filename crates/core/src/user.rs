//! Registered user record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entity, UserId};

/// What a stored password is replaced with before a user leaves the server.
pub const MASKED_PASSWORD: &str = "********";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Server-side password digest; never sent to clients unmasked.
    pub passwd: String,
    pub admin: bool,
    pub name: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Copy of this user safe to hand to clients and templates.
    pub fn masked(&self) -> Self {
        Self {
            passwd: MASKED_PASSWORD.to_string(),
            ..self.clone()
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
