use axum::http::{Uri, header};
use chrono::Utc;

use myblog_auth::{gravatar_url, hash_password, is_password_digest, is_valid_email, verify_password};
use myblog_core::{ApiError, User, UserId};
use myblog_infra::{Filter, Order};

use crate::app::dto;
use crate::app::errors::HandlerError;
use crate::app::reply::Reply;
use crate::app::routes::common::{all_matching, paged, requested_page, to_json_items};
use crate::app::state::AppState;
use crate::binder::{HandlerResult, Kwargs, RequestContext};
use crate::middleware::{clear_session_cookie, session_cookie};

pub async fn api_register_user(state: AppState, kw: Kwargs) -> HandlerResult {
    let name = kw.require("name")?;
    let email = kw.require("email")?;
    if !is_valid_email(&email) {
        return Err(ApiError::invalid("email").into());
    }
    let passwd = kw.require("passwd")?;
    if !is_password_digest(&passwd) {
        return Err(ApiError::invalid("passwd").into());
    }

    if state.users.count(&Filter::eq("email", &email)).await? > 0 {
        return Err(ApiError::other("register:failed", "email", "Email is already in use.").into());
    }

    // First account becomes the administrator.
    let admin = state.users.count(&Filter::All).await? == 0;
    let id = UserId::new();
    let user = User {
        id,
        passwd: hash_password(&id, &passwd),
        admin,
        name,
        image: gravatar_url(&email),
        email,
        created_at: Utc::now(),
    };
    state.users.save(&user).await?;
    tracing::info!(user_id = %user.id, admin, "registered user");

    signed_in(&state, &user)
}

pub async fn authenticate(state: AppState, kw: Kwargs) -> HandlerResult {
    let email = kw
        .require("email")
        .map_err(|_| ApiError::validation("email", "Invalid email."))?;
    let passwd = kw
        .require("passwd")
        .map_err(|_| ApiError::validation("passwd", "Invalid password."))?;

    let user = all_matching(state.users.as_ref(), Filter::eq("email", &email), Order::Oldest)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::validation("email", "Email not exist."))?;

    if !verify_password(&user.id, &passwd, &user.passwd) {
        tracing::info!(user_id = %user.id, "failed sign-in");
        return Err(ApiError::validation("passwd", "Invalid password.").into());
    }

    tracing::info!(user_id = %user.id, "signed in");
    signed_in(&state, &user)
}

pub async fn signout(state: AppState, kw: Kwargs) -> HandlerResult {
    let location = return_path(kw.request());
    if let Some(user) = kw.user() {
        tracing::info!(user_id = %user.id, "signed out");
    }
    Ok(Reply::redirect_with_cookie(
        &location,
        clear_session_cookie(&state.config.cookie_name),
    ))
}

/// Where to send the browser after sign-out: the referring page when it is
/// on this site, `/` otherwise.
fn return_path(request: Option<&RequestContext>) -> String {
    let home = || "/".to_string();
    let Some(request) = request else {
        return home();
    };
    let Some(referer) = request
        .header(header::REFERER.as_str())
        .and_then(|r| r.parse::<Uri>().ok())
    else {
        return home();
    };

    if let Some(authority) = referer.authority() {
        if request.header(header::HOST.as_str()) != Some(authority.as_str()) {
            return home();
        }
    }
    match referer.path_and_query().map(|p| p.as_str()) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => home(),
    }
}

pub async fn api_get_users(state: AppState, kw: Kwargs) -> HandlerResult {
    let (page, users) = paged(
        state.users.as_ref(),
        Filter::All,
        Order::Newest,
        requested_page(&kw),
        state.page_size(),
    )
    .await?;
    Ok(Reply::Json(dto::listing_to_json(
        &page,
        to_json_items(&users, dto::user_to_json),
    )))
}

/// JSON user reply carrying a fresh session cookie.
fn signed_in(state: &AppState, user: &User) -> HandlerResult {
    let value = state
        .sessions
        .issue(user, Utc::now())
        .map_err(HandlerError::Session)?;
    let cookie = session_cookie(
        &state.config.cookie_name,
        value,
        state.sessions.max_age().num_seconds(),
    );
    Ok(Reply::json_with_cookie(dto::user_to_json(user), cookie))
}
