use myblog_core::User;

/// Signed-in user for a request, inserted by the session middleware.
///
/// The stored password is always masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn new(user: &User) -> Self {
        Self(user.masked())
    }
}
