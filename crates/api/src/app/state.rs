//! Shared application state: repositories, session signer and configuration.

use std::sync::Arc;

use thiserror::Error;

use myblog_auth::{SessionError, SessionSigner};
use myblog_core::{Blog, Comment, User};
use myblog_infra::store::postgres;
use myblog_infra::{
    AppConfig, ConfigError, InMemoryRepository, PgRepository, Repository, StoreError,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("session signer: {0}")]
    Session(#[from] SessionError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn Repository<User>>,
    pub blogs: Arc<dyn Repository<Blog>>,
    pub comments: Arc<dyn Repository<Comment>>,
    pub sessions: SessionSigner,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State backed by process-local repositories.
    pub fn in_memory(config: AppConfig) -> Result<Self, StartupError> {
        config.validate()?;
        Ok(Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            blogs: Arc::new(InMemoryRepository::<Blog>::new()),
            comments: Arc::new(InMemoryRepository::<Comment>::new()),
            sessions: signer(&config)?,
            config: Arc::new(config),
        })
    }

    /// State backed by Postgres at `database_url`.
    pub async fn postgres(config: AppConfig, database_url: &str) -> Result<Self, StartupError> {
        config.validate()?;
        let pool = postgres::connect(database_url, config.db_max_connections).await?;
        Ok(Self {
            users: Arc::new(PgRepository::<User>::new(pool.clone())),
            blogs: Arc::new(PgRepository::<Blog>::new(pool.clone())),
            comments: Arc::new(PgRepository::<Comment>::new(pool)),
            sessions: signer(&config)?,
            config: Arc::new(config),
        })
    }

    /// Pick the store from `config`: Postgres when a database URL is set.
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        match config.database_url.clone() {
            Some(url) => {
                tracing::info!("using postgres store");
                Self::postgres(config, &url).await
            }
            None => {
                tracing::info!("DATABASE_URL not set; using in-memory store");
                Self::in_memory(config)
            }
        }
    }

    pub fn page_size(&self) -> u64 {
        self.config.page_size
    }
}

fn signer(config: &AppConfig) -> Result<SessionSigner, SessionError> {
    SessionSigner::with_max_age_secs(
        config.session_secret.as_bytes(),
        config.session_max_age_secs,
    )
}
