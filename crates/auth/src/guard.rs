//! Request-level authorization guards.
//!
//! - No IO
//! - No panics
//! - Pure policy check over the (optional) signed-in user

use myblog_core::{ApiError, User};

/// Require a signed-in user.
pub fn require_user(user: Option<&User>) -> Result<&User, ApiError> {
    user.ok_or_else(|| ApiError::permission("sign in required"))
}

/// Require a signed-in administrator.
pub fn require_admin(user: Option<&User>) -> Result<&User, ApiError> {
    match user {
        Some(u) if u.admin => Ok(u),
        _ => Err(ApiError::permission("")),
    }
}
