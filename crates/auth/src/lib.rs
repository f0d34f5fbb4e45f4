//! `myblog-auth` — credential checks and session cookies.
//!
//! This crate is intentionally decoupled from HTTP and storage: callers hand
//! in users and timestamps, and get back verdicts or cookie values.

pub mod credentials;
pub mod guard;
pub mod session;

pub use credentials::{gravatar_url, hash_password, is_password_digest, is_valid_email, verify_password};
pub use guard::{require_admin, require_user};
pub use session::{SessionClaims, SessionError, SessionSigner};
