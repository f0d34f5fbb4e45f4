//! Postgres-backed repositories.
//!
//! One table per record kind (`users`, `blogs`, `comments`). Column names come
//! from [`PgRecord::COLUMNS`]; filters on any other column are refused before a
//! query is built, so user input never reaches the SQL text.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use myblog_core::{Blog, BlogId, Comment, CommentId, User, UserId};

use super::{Filter, Order, Query, Record, Repository, StoreError, StoreResult};

pub type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Table mapping for a record kind.
pub trait PgRecord: Record {
    const TABLE: &'static str;

    /// Column list; the first entry is the primary key.
    const COLUMNS: &'static [&'static str];

    fn id_uuid(id: &Self::Id) -> Uuid;

    /// Bind every column value, in [`Self::COLUMNS`] order.
    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

/// Open a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Postgres-backed repository for one record kind.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug)]
pub struct PgRepository<T> {
    pool: Arc<PgPool>,
    _record: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for PgRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: std::marker::PhantomData,
        }
    }
}

impl<T: PgRecord> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _record: std::marker::PhantomData,
        }
    }

    fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a Filter) -> StoreResult<()> {
        match filter {
            Filter::All => Ok(()),
            Filter::Eq { column, value } => {
                if !T::COLUMNS.contains(&column.as_str()) {
                    return Err(StoreError::InvalidQuery(format!(
                        "unknown {} column '{}'",
                        T::KIND,
                        column
                    )));
                }
                qb.push(" WHERE ");
                qb.push(column.as_str());
                qb.push("::text = ");
                qb.push_bind(value.as_str());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<T: PgRecord> Repository<T> for PgRepository<T> {
    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn find(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            T::COLUMNS.join(", "),
            T::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(T::id_uuid(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        row.map(|r| T::from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find", e))
    }

    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn find_all(&self, query: &Query) -> StoreResult<Vec<T>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(T::COLUMNS.join(", "));
        qb.push(" FROM ");
        qb.push(T::TABLE);
        Self::push_filter(&mut qb, &query.filter)?;
        qb.push(match query.order {
            Order::Oldest => " ORDER BY created_at ASC",
            Order::Newest => " ORDER BY created_at DESC",
        });
        if let Some(window) = query.window {
            qb.push(" LIMIT ");
            qb.push_bind(window.limit as i64);
            qb.push(" OFFSET ");
            qb.push_bind(window.offset as i64);
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(T::from_row(&row).map_err(|e| map_sqlx_error("find_all", e))?);
        }
        Ok(records)
    }

    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM ");
        qb.push(T::TABLE);
        Self::push_filter(&mut qb, filter)?;

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn save(&self, record: &T) -> StoreResult<()> {
        let placeholders = (1..=T::COLUMNS.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders
        );
        record
            .bind_columns(sqlx::query(&sql))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("save", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn update(&self, record: &T) -> StoreResult<()> {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| format!("{c} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {} WHERE id = $1", T::TABLE, assignments);

        let result = record
            .bind_columns(sqlx::query(&sql))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip_all, fields(table = T::TABLE), err)]
    async fn remove(&self, id: &T::Id) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(T::id_uuid(id))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl PgRecord for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "email", "passwd", "admin", "name", "image", "created_at"];

    fn id_uuid(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(self.email.clone())
            .bind(self.passwd.clone())
            .bind(self.admin)
            .bind(self.name.clone())
            .bind(self.image.clone())
            .bind(self.created_at)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: UserId::from_uuid(row.try_get("id")?),
            email: row.try_get("email")?,
            passwd: row.try_get("passwd")?,
            admin: row.try_get("admin")?,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

impl PgRecord for Blog {
    const TABLE: &'static str = "blogs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "user_name",
        "user_image",
        "name",
        "summary",
        "content",
        "created_at",
    ];

    fn id_uuid(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(*self.user_id.as_uuid())
            .bind(self.user_name.clone())
            .bind(self.user_image.clone())
            .bind(self.name.clone())
            .bind(self.summary.clone())
            .bind(self.content.clone())
            .bind(self.created_at)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Blog {
            id: BlogId::from_uuid(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            user_name: row.try_get("user_name")?,
            user_image: row.try_get("user_image")?,
            name: row.try_get("name")?,
            summary: row.try_get("summary")?,
            content: row.try_get("content")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

impl PgRecord for Comment {
    const TABLE: &'static str = "comments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "blog_id",
        "user_id",
        "user_name",
        "user_image",
        "content",
        "created_at",
    ];

    fn id_uuid(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(*self.blog_id.as_uuid())
            .bind(*self.user_id.as_uuid())
            .bind(self.user_name.clone())
            .bind(self.user_image.clone())
            .bind(self.content.clone())
            .bind(self.created_at)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Comment {
            id: CommentId::from_uuid(row.try_get("id")?),
            blog_id: BlogId::from_uuid(row.try_get("blog_id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            user_name: row.try_get("user_name")?,
            user_image: row.try_get("user_image")?,
            content: row.try_get("content")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
