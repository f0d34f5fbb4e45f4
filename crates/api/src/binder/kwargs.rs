use axum::http::{HeaderMap, Method, request::Parts};
use serde_json::{Map, Value};

use myblog_core::{ApiError, User};

use crate::context::CurrentUser;

/// The request head as handlers see it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    headers: HeaderMap,
    user: Option<User>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            headers: parts.headers.clone(),
            user: parts
                .extensions
                .get::<CurrentUser>()
                .map(|current| current.0.clone()),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Signed-in user resolved by the session middleware (password masked).
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Named values bound for one handler call.
#[derive(Debug, Clone, Default)]
pub struct Kwargs {
    values: Map<String, Value>,
    request: Option<RequestContext>,
}

impl Kwargs {
    pub fn new(values: Map<String, Value>, request: Option<RequestContext>) -> Self {
        Self { values, request }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// The value as text. Scalars are rendered, so `{"a": 1}` and `a=1` read
    /// the same; `null` counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.text(name).unwrap_or_else(|| default.to_string())
    }

    /// Non-blank, trimmed text, or a validation error naming the field.
    pub fn require(&self, name: &str) -> Result<String, ApiError> {
        match self.text(name) {
            Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => Err(ApiError::invalid(name)),
        }
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.request.as_ref().and_then(RequestContext::user)
    }
}
