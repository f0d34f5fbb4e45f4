use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use time::Duration;

use myblog_auth::SessionClaims;
use myblog_core::User;

use crate::app::state::AppState;
use crate::context::CurrentUser;

/// Resolve the session cookie into a [`CurrentUser`] extension.
///
/// A missing or bad cookie never fails the request; it just stays anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = cookie_value(req.headers(), &state.config.cookie_name) {
        if let Some(user) = resolve_user(&state, cookie).await {
            req.extensions_mut().insert(CurrentUser::new(&user));
        }
    }

    next.run(req).await
}

async fn resolve_user(state: &AppState, cookie: String) -> Option<User> {
    let claims = match SessionClaims::parse(&cookie) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring session cookie");
            return None;
        }
    };

    let user = match state.users.find(&claims.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.user_id, "session for unknown user");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed");
            return None;
        }
    };

    match state.sessions.verify(&claims, &user.passwd, Utc::now()) {
        Ok(()) => Some(user),
        Err(e) => {
            tracing::debug!(user_id = %claims.user_id, error = %e, "rejected session cookie");
            None
        }
    }
}

/// Value of cookie `name`, if present. Surrounding quotes are dropped.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` carrying a session.
pub fn session_cookie(name: &str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// `Set-Cookie` clearing the session.
pub fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), "-deleted-"))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::COOKIE};

    use super::*;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; myblogsession=abc-1-ff"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));

        assert_eq!(cookie_value(&headers, "myblogsession").as_deref(), Some("abc-1-ff"));
        assert_eq!(cookie_value(&headers, "b").as_deref(), Some("2"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn quoted_cookie_value_is_unquoted() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("myblogsession=\"abc-1-ff\""));
        assert_eq!(cookie_value(&headers, "myblogsession").as_deref(), Some("abc-1-ff"));
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("myblogsession="));
        assert_eq!(cookie_value(&headers, "myblogsession"), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("s", "v".into(), 60);
        assert_eq!(cookie.name_value(), ("s", "v"));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));

        let cleared = clear_session_cookie("s");
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
        assert!(cleared.to_string().contains("Max-Age=0"));
    }
}
