//! Configuration loading and representation.
//!
//! The process builds one [`AppConfig`] at startup and passes it down; nothing
//! reads the environment after that.

use std::net::SocketAddr;

use thiserror::Error;

/// Used when `MYBLOG_SESSION_SECRET` is unset. Never deploy with it.
pub const DEV_SESSION_SECRET: &str = "dev-session-secret";

/// Upper bound for `MYBLOG_SESSION_MAX_AGE_SECS` (one year).
pub const MAX_SESSION_AGE_SECS: i64 = 365 * 86_400;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub cookie_name: String,
    pub session_max_age_secs: i64,
    pub page_size: u64,
    pub body_limit_bytes: usize,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            session_secret: DEV_SESSION_SECRET.to_string(),
            cookie_name: "myblogsession".to_string(),
            session_max_age_secs: 86_400,
            page_size: myblog_core::pagination::DEFAULT_PAGE_SIZE,
            body_limit_bytes: 1024 * 1024,
            database_url: None,
            db_max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_secret = match get("MYBLOG_SESSION_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("MYBLOG_SESSION_SECRET not set; using insecure dev default");
                defaults.session_secret
            }
        };

        let config = Self {
            bind_addr: parse(&get, "MYBLOG_BIND_ADDR", defaults.bind_addr)?,
            session_secret,
            cookie_name: get("MYBLOG_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            session_max_age_secs: parse(
                &get,
                "MYBLOG_SESSION_MAX_AGE_SECS",
                defaults.session_max_age_secs,
            )?,
            page_size: parse(&get, "MYBLOG_PAGE_SIZE", defaults.page_size)?.max(1),
            body_limit_bytes: parse(&get, "MYBLOG_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse(
                &get,
                "MYBLOG_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break cookie handling later on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_cookie_name(&self.cookie_name) {
            return Err(ConfigError::Invalid {
                key: "MYBLOG_COOKIE_NAME",
                value: self.cookie_name.clone(),
            });
        }
        if !(1..=MAX_SESSION_AGE_SECS).contains(&self.session_max_age_secs) {
            return Err(ConfigError::Invalid {
                key: "MYBLOG_SESSION_MAX_AGE_SECS",
                value: self.session_max_age_secs.to_string(),
            });
        }
        Ok(())
    }
}

/// RFC 6265 cookie-name token, restricted to characters that need no quoting.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.session_secret, DEV_SESSION_SECRET);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn values_override_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("MYBLOG_BIND_ADDR", "127.0.0.1:8080"),
            ("MYBLOG_SESSION_SECRET", "s3cret"),
            ("MYBLOG_PAGE_SIZE", "5"),
            ("DATABASE_URL", "postgres://localhost/awesome"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cfg.session_secret, "s3cret");
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/awesome"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn bad_numbers_are_reported_with_key() {
        let err = AppConfig::from_lookup(lookup(&[("MYBLOG_PAGE_SIZE", "ten")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "MYBLOG_PAGE_SIZE",
                value: "ten".into()
            }
        );
    }

    #[test]
    fn session_max_age_must_be_positive_and_bounded() {
        for raw in ["0", "-5", "9223372036854775807", "31536001"] {
            let err = AppConfig::from_lookup(lookup(&[("MYBLOG_SESSION_MAX_AGE_SECS", raw)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "MYBLOG_SESSION_MAX_AGE_SECS", .. }),
                "{raw}"
            );
        }

        let cfg = AppConfig::from_lookup(lookup(&[("MYBLOG_SESSION_MAX_AGE_SECS", "31536000")]))
            .unwrap();
        assert_eq!(cfg.session_max_age_secs, MAX_SESSION_AGE_SECS);
    }

    #[test]
    fn cookie_name_must_be_a_plain_token() {
        for raw in ["my session", "a;b", "s=1", "k\"x"] {
            let err = AppConfig::from_lookup(lookup(&[("MYBLOG_COOKIE_NAME", raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key: "MYBLOG_COOKIE_NAME",
                    value: raw.into()
                }
            );
        }
        let cfg = AppConfig::from_lookup(lookup(&[("MYBLOG_COOKIE_NAME", "blog_sid.v2")])).unwrap();
        assert_eq!(cfg.cookie_name, "blog_sid.v2");
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        let cfg = AppConfig::from_lookup(lookup(&[("MYBLOG_PAGE_SIZE", "0")])).unwrap();
        assert_eq!(cfg.page_size, 1);
    }
}
