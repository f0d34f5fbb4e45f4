use serde_json::json;

use myblog_auth::{require_admin, require_user};
use myblog_core::{ApiError, Comment, CommentId};
use myblog_infra::{Filter, Order};

use crate::app::dto;
use crate::app::reply::Reply;
use crate::app::routes::blogs::find_blog;
use crate::app::routes::common::{id_param, paged, requested_page, to_json_items};
use crate::app::state::AppState;
use crate::binder::{HandlerResult, Kwargs};

pub async fn api_comments(state: AppState, kw: Kwargs) -> HandlerResult {
    let (page, comments) = paged(
        state.comments.as_ref(),
        Filter::All,
        Order::Newest,
        requested_page(&kw),
        state.page_size(),
    )
    .await?;
    Ok(Reply::Json(dto::listing_to_json(
        &page,
        to_json_items(&comments, dto::comment_to_json),
    )))
}

pub async fn api_create_comment(state: AppState, kw: Kwargs) -> HandlerResult {
    let author = require_user(kw.user())?;
    let content = kw
        .require("content")
        .map_err(|_| ApiError::validation("content", "content cannot be empty."))?;
    let blog = find_blog(&state, &kw).await?;

    let comment = Comment::new(&blog, author, &content);
    state.comments.save(&comment).await?;
    tracing::info!(comment_id = %comment.id, blog_id = %blog.id, "created comment");

    Ok(Reply::Json(dto::comment_to_json(&comment)))
}

pub async fn api_delete_comment(state: AppState, kw: Kwargs) -> HandlerResult {
    require_admin(kw.user())?;
    let id: CommentId = id_param(&kw, "Comment")?;
    if state.comments.find(&id).await?.is_none() {
        return Err(ApiError::not_found("Comment").into());
    }
    state.comments.remove(&id).await?;
    tracing::info!(comment_id = %id, "deleted comment");

    Ok(Reply::Json(json!({ "id": id.to_string() })))
}
