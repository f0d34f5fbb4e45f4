use serde_json::json;

use myblog_auth::require_admin;
use myblog_core::{ApiError, Blog, BlogId};
use myblog_infra::{Filter, Order};

use crate::app::dto;
use crate::app::errors::HandlerError;
use crate::app::reply::Reply;
use crate::app::routes::common::{all_matching, id_param, paged, requested_page, to_json_items};
use crate::app::state::AppState;
use crate::binder::{HandlerResult, Kwargs};

pub async fn api_blogs(state: AppState, kw: Kwargs) -> HandlerResult {
    let (page, blogs) = paged(
        state.blogs.as_ref(),
        Filter::All,
        Order::Newest,
        requested_page(&kw),
        state.page_size(),
    )
    .await?;
    Ok(Reply::Json(dto::listing_to_json(
        &page,
        to_json_items(&blogs, dto::blog_to_json),
    )))
}

pub async fn api_get_blog(state: AppState, kw: Kwargs) -> HandlerResult {
    let blog = find_blog(&state, &kw).await?;
    Ok(Reply::Json(dto::blog_to_json(&blog)))
}

pub async fn api_create_blog(state: AppState, kw: Kwargs) -> HandlerResult {
    let author = require_admin(kw.user())?;
    let name = field(&kw, "name", "name cannot be empty.")?;
    let summary = field(&kw, "summary", "summary cannot be empty.")?;
    let content = field(&kw, "content", "content cannot be empty.")?;

    let blog = Blog::new(author, &name, &summary, &content);
    state.blogs.save(&blog).await?;
    tracing::info!(blog_id = %blog.id, user_id = %author.id, "created blog");

    Ok(Reply::Json(dto::blog_to_json(&blog)))
}

pub async fn api_modify_blog(state: AppState, kw: Kwargs) -> HandlerResult {
    require_admin(kw.user())?;
    let name = field(&kw, "name", "name cannot be empty.")?;
    let summary = field(&kw, "summary", "summary cannot be empty.")?;
    let content = field(&kw, "content", "content cannot be empty.")?;

    let mut blog = find_blog(&state, &kw).await?;
    blog.name = name;
    blog.summary = summary;
    blog.content = content;
    state.blogs.update(&blog).await?;
    tracing::info!(blog_id = %blog.id, "modified blog");

    Ok(Reply::Json(dto::blog_to_json(&blog)))
}

/// Delete a blog together with its comments.
pub async fn api_delete_blog(state: AppState, kw: Kwargs) -> HandlerResult {
    require_admin(kw.user())?;
    let blog = find_blog(&state, &kw).await?;

    let comments = all_matching(
        state.comments.as_ref(),
        Filter::eq("blog_id", blog.id),
        Order::Oldest,
    )
    .await?;
    for comment in &comments {
        state.comments.remove(&comment.id).await?;
    }
    state.blogs.remove(&blog.id).await?;
    tracing::info!(blog_id = %blog.id, comments = comments.len(), "deleted blog");

    Ok(Reply::Json(json!({ "id": blog.id.to_string() })))
}

pub(crate) async fn find_blog(state: &AppState, kw: &Kwargs) -> Result<Blog, HandlerError> {
    let id: BlogId = id_param(kw, "Blog")?;
    state
        .blogs
        .find(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog").into())
}

fn field(kw: &Kwargs, name: &str, message: &str) -> Result<String, ApiError> {
    kw.require(name)
        .map_err(|_| ApiError::validation(name, message))
}
