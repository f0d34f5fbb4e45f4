//! API error model.
//!
//! Handlers fail with an [`ApiError`] when the caller did something the blog
//! refuses (bad field, unknown id, missing privilege). The HTTP layer turns
//! these into a `{error, data, message}` body instead of a transport failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain API error family.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A submitted field failed a format/presence check.
    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    /// A referenced resource does not exist.
    #[error("{resource} not found: {message}")]
    NotFound { resource: String, message: String },

    /// The caller lacks the required privilege.
    #[error("permission denied: {message}")]
    Permission { message: String },

    /// Catch-all with an explicit error code.
    #[error("{error}: {message}")]
    Other {
        error: String,
        data: String,
        message: String,
    },
}

impl ApiError {
    pub const VALUE_INVALID: &'static str = "value:invalid";
    pub const VALUE_NOT_FOUND: &'static str = "value:notfound";
    pub const PERMISSION_FORBIDDEN: &'static str = "permission:forbidden";

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Validation failure without a human-readable message.
    pub fn invalid(field: impl Into<String>) -> Self {
        Self::validation(field, "")
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            message: String::new(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    pub fn other(
        error: impl Into<String>,
        data: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Other {
            error: error.into(),
            data: data.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            ApiError::Validation { .. } => Self::VALUE_INVALID,
            ApiError::NotFound { .. } => Self::VALUE_NOT_FOUND,
            ApiError::Permission { .. } => Self::PERMISSION_FORBIDDEN,
            ApiError::Other { error, .. } => error,
        }
    }

    /// The field, resource or subject the error refers to.
    pub fn data(&self) -> &str {
        match self {
            ApiError::Validation { field, .. } => field,
            ApiError::NotFound { resource, .. } => resource,
            ApiError::Permission { .. } => "permission",
            ApiError::Other { data, .. } => data,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Permission { message }
            | ApiError::Other { message, .. } => message,
        }
    }

    /// Wire representation of this error.
    pub fn body(&self) -> ApiErrorBody {
        ApiErrorBody {
            error: self.code().to_string(),
            data: self.data().to_string(),
            message: self.message().to_string(),
        }
    }
}

/// The `{error, data, message}` payload sent to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub data: String,
    pub message: String,
}

impl From<ApiError> for ApiErrorBody {
    fn from(value: ApiError) -> Self {
        value.body()
    }
}
