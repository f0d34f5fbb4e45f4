//! Building the keyword map for one request.
//!
//! Sources, in order of precedence: path captures, then the request body (write
//! methods) or query string (everything else). Repeated keys keep their first
//! occurrence.

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{Method, header::CONTENT_TYPE, request::Parts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use thiserror::Error;

use super::kwargs::{Kwargs, RequestContext};
use super::signature::Signature;
use crate::app::errors::json_error;

/// The request was malformed for this handler; the handler is never invoked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("missing content type")]
    MissingContentType,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("JSON body must be an object")]
    JsonNotObject,

    #[error("invalid form body: {0}")]
    InvalidForm(String),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),
}

impl BindError {
    pub fn code(&self) -> &'static str {
        match self {
            BindError::MissingContentType => "missing_content_type",
            BindError::UnsupportedContentType(_) => "unsupported_content_type",
            BindError::InvalidJson(_) => "invalid_json",
            BindError::JsonNotObject => "json_not_object",
            BindError::InvalidForm(_) => "invalid_form",
            BindError::BodyRead(_) => "invalid_body",
            BindError::MissingArgument(_) => "missing_argument",
        }
    }
}

impl IntoResponse for BindError {
    fn into_response(self) -> Response {
        json_error(StatusCode::BAD_REQUEST, self.code(), self.to_string())
    }
}

/// Methods whose keyword values come from the body.
pub fn is_write_method(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Run the whole binding pipeline for `req`.
pub async fn bind(
    sig: &Signature,
    req: Request,
    captures: Vec<(String, String)>,
    body_limit: usize,
) -> Result<Kwargs, BindError> {
    let (parts, body) = req.into_parts();

    let extracted = if sig.needs_keywords() {
        extract_keywords(&parts, body, body_limit).await?
    } else {
        None
    };

    let values = merge_captures(sig, extracted, captures);
    check_required(sig, &values)?;

    let request = sig
        .has_request_param()
        .then(|| RequestContext::from_parts(&parts));
    Ok(Kwargs::new(values, request))
}

/// Read keyword values from the body or query string.
///
/// `None` means nothing was read (a read method without a query string).
pub async fn extract_keywords(
    parts: &Parts,
    body: Body,
    body_limit: usize,
) -> Result<Option<Map<String, Value>>, BindError> {
    if !is_write_method(&parts.method) {
        return Ok(parts
            .uri
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| first_values(q.as_bytes())));
    }

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(BindError::MissingContentType)?;
    let mime = content_type.to_ascii_lowercase();

    if mime.starts_with("application/json") {
        let bytes = read_body(body, body_limit).await?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| BindError::InvalidJson(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(BindError::JsonNotObject),
        }
    } else if mime.starts_with("application/x-www-form-urlencoded") {
        let bytes = read_body(body, body_limit).await?;
        Ok(Some(first_values(&bytes)))
    } else if mime.starts_with("multipart/form-data") {
        let bytes = read_body(body, body_limit).await?;
        read_multipart(content_type, bytes).await.map(Some)
    } else {
        Err(BindError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Combine extracted values with path captures.
///
/// Without extracted values the captures are used as-is. Otherwise, unless the
/// handler takes arbitrary keywords, values it does not name are dropped, and
/// captures are overlaid on top.
pub fn merge_captures(
    sig: &Signature,
    extracted: Option<Map<String, Value>>,
    captures: Vec<(String, String)>,
) -> Map<String, Value> {
    let Some(mut values) = extracted else {
        return captures
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
    };

    if !sig.has_var_keyword_param() {
        values.retain(|k, _| sig.named_params().iter().any(|n| n == k));
    }

    for (key, value) in captures {
        if values.contains_key(&key) {
            tracing::info!(arg = %key, "duplicate arg name in named arg and kw args");
        }
        values.insert(key, Value::String(value));
    }

    values
}

pub fn check_required(sig: &Signature, values: &Map<String, Value>) -> Result<(), BindError> {
    match sig.required_params().iter().find(|name| !values.contains_key(*name)) {
        Some(missing) => Err(BindError::MissingArgument(missing.clone())),
        None => Ok(()),
    }
}

fn first_values(input: &[u8]) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(input) {
        map.entry(key.into_owned())
            .or_insert_with(|| Value::String(value.into_owned()));
    }
    map
}

async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, BindError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| BindError::BodyRead(e.to_string()))
}

/// Text fields of an already size-checked multipart body.
async fn read_multipart(
    content_type: &str,
    bytes: axum::body::Bytes,
) -> Result<Map<String, Value>, BindError> {
    let req = Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|e| BindError::InvalidForm(e.to_string()))?;
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| BindError::InvalidForm(e.to_string()))?;

    let mut map = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BindError::InvalidForm(e.to_string()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|e| BindError::InvalidForm(e.to_string()))?;
        map.entry(name).or_insert(Value::String(text));
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::binder::Param;

    fn sig(params: &[Param]) -> Signature {
        Signature::from_params("test", params).unwrap()
    }

    fn captures(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn request(method: Method, uri: &str, content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn query_string_keeps_first_occurrence() {
        let s = sig(&[Param::keyword("a"), Param::keyword("b")]);
        let kw = bind(&s, request(Method::GET, "/x?a=1&b=2&a=3", None, ""), vec![], 1024)
            .await
            .unwrap();

        assert_eq!(kw.values(), json!({"a": "1", "b": "2"}).as_object().unwrap());
    }

    #[tokio::test]
    async fn json_body_must_be_an_object() {
        let s = sig(&[Param::keyword("a")]);
        let err = bind(
            &s,
            request(Method::POST, "/x", Some("application/json"), "[1, 2]"),
            vec![],
            1024,
        )
        .await
        .unwrap_err();
        assert_eq!(err, BindError::JsonNotObject);

        let err = bind(
            &s,
            request(Method::POST, "/x", Some("application/json"), "{nope"),
            vec![],
            1024,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BindError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn write_methods_need_a_known_content_type() {
        let s = sig(&[Param::keyword("a")]);

        let err = bind(&s, request(Method::PUT, "/x", None, "a=1"), vec![], 1024)
            .await
            .unwrap_err();
        assert_eq!(err, BindError::MissingContentType);

        let err = bind(&s, request(Method::PATCH, "/x", Some("text/plain"), "a=1"), vec![], 1024)
            .await
            .unwrap_err();
        assert_eq!(err, BindError::UnsupportedContentType("text/plain".into()));
    }

    #[tokio::test]
    async fn form_body_binds_flat_pairs() {
        let s = sig(&[Param::keyword("name"), Param::optional("summary")]);
        let kw = bind(
            &s,
            request(
                Method::POST,
                "/x",
                Some("application/x-www-form-urlencoded; charset=utf-8"),
                "name=Hello+World&summary=s%21&name=other",
            ),
            vec![],
            1024,
        )
        .await
        .unwrap();

        assert_eq!(kw.text("name").as_deref(), Some("Hello World"));
        assert_eq!(kw.text("summary").as_deref(), Some("s!"));
    }

    #[tokio::test]
    async fn multipart_text_fields_bind_and_files_are_skipped() {
        let s = sig(&[Param::rest()]);
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            first\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            file body\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            second\r\n\
            --XYZ--\r\n";
        let kw = bind(
            &s,
            request(Method::POST, "/x", Some("multipart/form-data; boundary=XYZ"), body),
            vec![],
            4096,
        )
        .await
        .unwrap();

        assert_eq!(kw.values(), json!({"title": "first"}).as_object().unwrap());
    }

    #[tokio::test]
    async fn oversized_body_is_a_client_error() {
        let s = sig(&[Param::keyword("a")]);
        let err = bind(
            &s,
            request(Method::POST, "/x", Some("application/json"), r#"{"a": "0123456789"}"#),
            vec![],
            4,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BindError::BodyRead(_)));
    }

    #[tokio::test]
    async fn oversized_multipart_body_is_a_client_error() {
        let s = sig(&[Param::keyword("title")]);
        let body = format!(
            "--XYZ\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{}\r\n--XYZ--\r\n",
            "x".repeat(4096)
        );
        let err = bind(
            &s,
            request(Method::POST, "/x", Some("multipart/form-data; boundary=XYZ"), &body),
            vec![],
            16,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BindError::BodyRead(_)));
        assert_eq!(err.code(), "invalid_body");
    }

    #[test]
    fn captures_are_used_when_nothing_was_extracted() {
        let s = sig(&[Param::keyword("id")]);
        let values = merge_captures(&s, None, captures(&[("id", "42")]));
        assert_eq!(values, *json!({"id": "42"}).as_object().unwrap());
    }

    #[test]
    fn undeclared_values_are_dropped_and_captures_win() {
        let s = sig(&[Param::path("id"), Param::keyword("content")]);
        let extracted = json!({"id": "from-body", "content": "hi", "extra": 1});
        let values = merge_captures(
            &s,
            extracted.as_object().cloned(),
            captures(&[("id", "from-path")]),
        );

        assert_eq!(
            values,
            *json!({"id": "from-path", "content": "hi"}).as_object().unwrap()
        );
    }

    #[test]
    fn rest_param_keeps_everything() {
        let s = sig(&[Param::rest()]);
        let extracted = json!({"x": 1, "y": 2});
        let values = merge_captures(&s, extracted.as_object().cloned(), vec![]);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn missing_required_names_the_parameter() {
        let s = sig(&[Param::keyword("a"), Param::keyword("b"), Param::optional("c")]);
        let values = json!({"a": "1"});
        assert_eq!(
            check_required(&s, values.as_object().unwrap()),
            Err(BindError::MissingArgument("b".into()))
        );
    }

    #[tokio::test]
    async fn request_is_attached_only_when_declared() {
        let s = sig(&[Param::path("id"), Param::request()]);
        let kw = bind(&s, request(Method::POST, "/x/1", None, ""), captures(&[("id", "1")]), 1024)
            .await
            .unwrap();
        assert_eq!(kw.request().map(|r| r.method().clone()), Some(Method::POST));
        assert_eq!(kw.text("id").as_deref(), Some("1"));

        let s = sig(&[Param::path("id")]);
        let kw = bind(&s, request(Method::GET, "/x/1", None, ""), captures(&[("id", "1")]), 1024)
            .await
            .unwrap();
        assert!(kw.request().is_none());
    }
}
