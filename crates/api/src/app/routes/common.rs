use std::str::FromStr;

use serde_json::Value;

use myblog_core::{ApiError, Page, page_index};
use myblog_infra::{Filter, Order, Query, Record, Repository, StoreResult};

use crate::binder::Kwargs;

/// Parse an id from the bound keywords; anything unparseable is "not found".
pub fn id_param<I: FromStr>(kw: &Kwargs, resource: &str) -> Result<I, ApiError> {
    let raw = kw.require("id")?;
    raw.parse().map_err(|_| ApiError::not_found(resource))
}

/// Requested page number; lenient, defaults to 1.
pub fn requested_page(kw: &Kwargs) -> u64 {
    page_index(&kw.text_or("page", "1"))
}

/// One page of `repo` matching `filter`, plus the page descriptor.
///
/// Skips the listing query when the page is empty.
pub async fn paged<T: Record>(
    repo: &dyn Repository<T>,
    filter: Filter,
    order: Order,
    index: u64,
    page_size: u64,
) -> StoreResult<(Page, Vec<T>)> {
    let total = repo.count(&filter).await?;
    let page = Page::new(total, index, page_size);
    if page.is_empty() {
        return Ok((page, Vec::new()));
    }

    let items = repo
        .find_all(&Query::all().filter(filter).order(order).page(&page))
        .await?;
    Ok((page, items))
}

/// Records of `repo` matching `filter`, in `order`, without paging.
pub async fn all_matching<T: Record>(
    repo: &dyn Repository<T>,
    filter: Filter,
    order: Order,
) -> StoreResult<Vec<T>> {
    repo.find_all(&Query::all().filter(filter).order(order)).await
}

pub fn to_json_items<T>(items: &[T], f: impl Fn(&T) -> Value) -> Vec<Value> {
    items.iter().map(f).collect()
}
