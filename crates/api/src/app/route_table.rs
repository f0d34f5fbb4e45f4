//! Declarative route registration.
//!
//! Handlers are registered as `(method, pattern, name, manifest, fn)` entries.
//! Patterns use `{name}` captures; the table validates everything up front and
//! then builds an axum router whose endpoints all go through the binder.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter, on};
use thiserror::Error;

use super::reply::{JsonPageRenderer, TemplateRenderer};
use crate::binder::{DEFAULT_BODY_LIMIT, Handler, Param, ParamKind, RequestHandler, SignatureError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route {method} {pattern} registered twice")]
    Duplicate { method: Method, pattern: String },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    #[error("method {0} cannot be routed")]
    UnsupportedMethod(Method),

    #[error("{handler}: path parameter '{name}' is not captured by '{pattern}'")]
    UnknownCapture {
        handler: String,
        name: String,
        pattern: String,
    },

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

pub struct Route<S> {
    method: Method,
    filter: MethodFilter,
    pattern: String,
    handler: RequestHandler<S>,
}

impl<S> Route<S> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &RequestHandler<S> {
        &self.handler
    }
}

pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
    renderer: Arc<dyn TemplateRenderer>,
    body_limit: usize,
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            renderer: Arc::new(JsonPageRenderer),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    pub fn get(
        &mut self,
        pattern: &str,
        name: &str,
        params: &[Param],
        handler: impl Handler<S>,
    ) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, pattern, name, params, handler)
    }

    pub fn post(
        &mut self,
        pattern: &str,
        name: &str,
        params: &[Param],
        handler: impl Handler<S>,
    ) -> Result<&mut Self, RouteError> {
        self.route(Method::POST, pattern, name, params, handler)
    }

    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        params: &[Param],
        handler: impl Handler<S>,
    ) -> Result<&mut Self, RouteError> {
        let captures = pattern_captures(pattern)?;
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RouteError::UnsupportedMethod(method.clone()))?;

        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.pattern == pattern)
        {
            return Err(RouteError::Duplicate {
                method,
                pattern: pattern.to_string(),
            });
        }

        let handler = RequestHandler::new(name, params, handler)?;
        for param in params.iter().filter(|p| p.kind() == ParamKind::Path) {
            if !captures.iter().any(|c| c == param.name()) {
                return Err(RouteError::UnknownCapture {
                    handler: name.to_string(),
                    name: param.name().to_string(),
                    pattern: pattern.to_string(),
                });
            }
        }

        tracing::info!(
            %method,
            pattern,
            handler = name,
            params = ?params.iter().map(Param::name).collect::<Vec<_>>(),
            "add route"
        );
        self.routes.push(Route {
            method,
            filter,
            pattern: pattern.to_string(),
            handler,
        });
        Ok(self)
    }

    /// Build the axum router; methods sharing a pattern share one path entry.
    pub fn into_router(self) -> Router<S> {
        let mut grouped: Vec<(String, MethodRouter<S>)> = Vec::new();

        for route in self.routes {
            let path = axum_path(&route.pattern);
            let handler = Arc::new(route.handler.with_body_limit(self.body_limit));
            let renderer = Arc::clone(&self.renderer);

            let endpoint = move |State(state): State<S>,
                                 captures: Option<Path<Vec<(String, String)>>>,
                                 req: Request| {
                let handler = Arc::clone(&handler);
                let renderer = Arc::clone(&renderer);
                async move {
                    let captures = captures.map(|Path(c)| c).unwrap_or_default();
                    handler.process(state, renderer.as_ref(), captures, req).await
                }
            };

            match grouped.iter().position(|(p, _)| *p == path) {
                Some(i) => {
                    let (path, methods) = grouped.swap_remove(i);
                    grouped.push((path, methods.on(route.filter, endpoint)));
                }
                None => grouped.push((path, on(route.filter, endpoint))),
            }
        }

        grouped
            .into_iter()
            .fold(Router::new(), |router, (path, methods)| router.route(&path, methods))
    }
}

/// Capture names in `pattern`, validating its shape.
fn pattern_captures(pattern: &str) -> Result<Vec<String>, RouteError> {
    let invalid = |reason| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut captures = Vec::new();
    for segment in pattern.split('/') {
        match (segment.strip_prefix('{'), segment.strip_suffix('}')) {
            (Some(_), Some(_)) => {
                let name = &segment[1..segment.len() - 1];
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(invalid("bad capture name"));
                }
                if captures.iter().any(|c| c == name) {
                    return Err(invalid("capture used twice"));
                }
                captures.push(name.to_string());
            }
            _ if segment.contains(['{', '}']) => {
                return Err(invalid("captures must span a whole segment"));
            }
            _ => {}
        }
    }
    Ok(captures)
}

/// `/blog/{id}` → `/blog/:id`.
fn axum_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => format!(":{name}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
