//! Registration and sign-in input checks plus password digesting.
//!
//! Browsers never send a plaintext password: they submit a 40-character hex
//! digest computed client-side. The server salts that digest with the user id
//! before storing it.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use myblog_core::UserId;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-z._\-]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$").expect("email pattern")
});

static CLIENT_DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("digest pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Whether `passwd` has the shape of the client-side password digest.
pub fn is_password_digest(passwd: &str) -> bool {
    CLIENT_DIGEST.is_match(passwd)
}

/// Digest stored for a user: hex SHA-256 of `"{user_id}:{client_digest}"`.
pub fn hash_password(user_id: &UserId, client_digest: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(client_digest.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(user_id: &UserId, client_digest: &str, stored: &str) -> bool {
    hash_password(user_id, client_digest) == stored
}

/// Avatar URL for an email address (Gravatar accepts SHA-256 hashes).
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{}?d=mm&s=120", hex::encode(digest))
}
