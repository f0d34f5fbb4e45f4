//! Infrastructure layer: record storage and process configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{
    Filter, InMemoryRepository, Order, PgRecord, PgRepository, Query, Record, Repository,
    StoreError, StoreResult,
};
