//! Parameter binder.
//!
//! Adapts plain `async fn(state, kwargs)` handlers to axum requests. Each handler
//! declares a manifest of [`Param`]s; per request the binder gathers keyword
//! values from the JSON/form/multipart body or the query string, reconciles them
//! with path captures, checks required names and only then calls the handler.

pub mod extract;
pub mod handler;
pub mod kwargs;
pub mod signature;

pub use extract::BindError;
pub use handler::{DEFAULT_BODY_LIMIT, Handler, HandlerFuture, HandlerResult, RequestHandler};
pub use kwargs::{Kwargs, RequestContext};
pub use signature::{Param, ParamKind, Signature, SignatureError};
