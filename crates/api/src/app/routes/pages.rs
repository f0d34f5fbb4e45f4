//! Template-backed pages.
//!
//! Every page carries the signed-in user (or `null`) under `user`.

use serde_json::{Value, json};

use myblog_infra::{Filter, Order};

use crate::app::dto;
use crate::app::reply::Reply;
use crate::app::routes::blogs::find_blog;
use crate::app::routes::common::{all_matching, paged, requested_page, to_json_items};
use crate::app::state::AppState;
use crate::binder::{HandlerResult, Kwargs};

pub async fn index(state: AppState, kw: Kwargs) -> HandlerResult {
    let (page, blogs) = paged(
        state.blogs.as_ref(),
        Filter::All,
        Order::Newest,
        requested_page(&kw),
        state.page_size(),
    )
    .await?;
    Ok(page_reply(
        "blogs.html",
        &kw,
        json!({
            "page": page,
            "blogs": to_json_items(&blogs, dto::blog_to_json),
        }),
    ))
}

pub async fn register(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(page_reply("register.html", &kw, json!({})))
}

pub async fn signin(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(page_reply("signin.html", &kw, json!({})))
}

pub async fn blog_detail(state: AppState, kw: Kwargs) -> HandlerResult {
    let blog = find_blog(&state, &kw).await?;
    let comments = all_matching(
        state.comments.as_ref(),
        Filter::eq("blog_id", blog.id),
        Order::Newest,
    )
    .await?;
    Ok(page_reply(
        "blog.html",
        &kw,
        json!({
            "blog": dto::blog_detail_to_json(&blog),
            "comments": to_json_items(&comments, dto::comment_to_json),
        }),
    ))
}

pub async fn show_all_users(state: AppState, kw: Kwargs) -> HandlerResult {
    let users = all_matching(state.users.as_ref(), Filter::All, Order::Newest).await?;
    Ok(page_reply(
        "all_users.html",
        &kw,
        json!({ "users": to_json_items(&users, dto::user_to_json) }),
    ))
}

pub async fn manage(_state: AppState, _kw: Kwargs) -> HandlerResult {
    Ok(Reply::redirect("/manage/comments"))
}

pub async fn manage_comments(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(manage_listing("manage_comments.html", &kw))
}

pub async fn manage_blogs(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(manage_listing("manage_blogs.html", &kw))
}

pub async fn manage_users(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(manage_listing("manage_users.html", &kw))
}

pub async fn manage_create_blog(_state: AppState, kw: Kwargs) -> HandlerResult {
    Ok(page_reply(
        "manage_blog_edit.html",
        &kw,
        json!({ "id": "", "action": "/api/blogs" }),
    ))
}

pub async fn manage_modify_blog(_state: AppState, kw: Kwargs) -> HandlerResult {
    let id = kw.require("id")?;
    Ok(page_reply(
        "manage_blog_modify.html",
        &kw,
        json!({ "id": id, "action": "/api/blogs/modify" }),
    ))
}

/// Management pages load their rows through the JSON API; they only need the page number.
fn manage_listing(template: &'static str, kw: &Kwargs) -> Reply {
    page_reply(template, kw, json!({ "page_index": requested_page(kw) }))
}

fn page_reply(template: &'static str, kw: &Kwargs, mut data: Value) -> Reply {
    data["user"] = kw.user().map(dto::user_to_json).unwrap_or(Value::Null);
    Reply::page(template, data)
}
