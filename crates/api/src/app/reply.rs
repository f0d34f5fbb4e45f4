//! Handler outcomes and how they become responses.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Value, json};

/// Seam for a template engine.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Response;
}

/// Answers page replies with `{"template": name, "data": ...}` as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageRenderer;

impl TemplateRenderer for JsonPageRenderer {
    fn render(&self, template: &str, data: &Value) -> Response {
        axum::Json(json!({
            "template": template,
            "data": data,
        }))
        .into_response()
    }
}

#[derive(Debug)]
pub enum Reply {
    Json(Value),
    Page { template: &'static str, data: Value },
    Html(String),
    Redirect(String),
    Response(Response),
}

impl Reply {
    pub fn page(template: &'static str, data: Value) -> Self {
        Reply::Page { template, data }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Reply::Redirect(location.into())
    }

    /// JSON reply that also sets `cookie`.
    pub fn json_with_cookie(value: Value, cookie: Cookie<'static>) -> Self {
        Reply::Response((CookieJar::new().add(cookie), axum::Json(value)).into_response())
    }

    /// Redirect that also sets `cookie`.
    pub fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> Self {
        Reply::Response((CookieJar::new().add(cookie), redirect(location)).into_response())
    }

    pub fn render(self, renderer: &dyn TemplateRenderer) -> Response {
        match self {
            Reply::Json(value) => axum::Json(value).into_response(),
            Reply::Page { template, data } => renderer.render(template, &data),
            Reply::Html(body) => Html(body).into_response(),
            Reply::Redirect(location) => redirect(&location),
            Reply::Response(res) => res,
        }
    }
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(v) => (StatusCode::FOUND, [(header::LOCATION, v)]).into_response(),
        Err(_) => (StatusCode::FOUND, [(header::LOCATION, HeaderValue::from_static("/"))]).into_response(),
    }
}
