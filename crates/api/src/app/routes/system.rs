use serde_json::json;

use crate::app::reply::Reply;
use crate::app::state::AppState;
use crate::binder::{HandlerResult, Kwargs};

pub async fn health(_state: AppState, _kw: Kwargs) -> HandlerResult {
    Ok(Reply::Json(json!({ "status": "ok" })))
}
