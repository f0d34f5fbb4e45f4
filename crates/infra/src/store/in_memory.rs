use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Filter, Order, Query, Record, Repository, StoreError, StoreResult};

/// In-memory repository for tests/dev.
#[derive(Debug)]
pub struct InMemoryRepository<T: Record> {
    inner: RwLock<BTreeMap<T::Id, T>>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn filter_matches<T: Record>(record: &T, filter: &Filter) -> StoreResult<bool> {
    match filter {
        Filter::All => Ok(true),
        Filter::Eq { column, value } => match record.column(column) {
            Some(v) => Ok(&v == value),
            None => Err(StoreError::InvalidQuery(format!(
                "unknown {} column '{}'",
                T::KIND,
                column
            ))),
        },
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn find(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    async fn find_all(&self, query: &Query) -> StoreResult<Vec<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;

        let mut out = Vec::new();
        for record in map.values() {
            if filter_matches(record, &query.filter)? {
                out.push(record.clone());
            }
        }
        drop(map);

        match query.order {
            Order::Oldest => out.sort_by_key(|r| r.created_at()),
            Order::Newest => out.sort_by_key(|r| std::cmp::Reverse(r.created_at())),
        }

        if let Some(window) = query.window {
            out = out
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect();
        }
        Ok(out)
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut n = 0;
        for record in map.values() {
            if filter_matches(record, filter)? {
                n += 1;
            }
        }
        Ok(n)
    }

    async fn save(&self, record: &T) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(record.id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        map.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(record.id()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind: T::KIND,
                id: record.id().to_string(),
            }),
        }
    }

    async fn remove(&self, id: &T::Id) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            }),
        }
    }
}
