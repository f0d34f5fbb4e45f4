use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

use super::extract::bind;
use super::kwargs::Kwargs;
use super::signature::{Param, Signature, SignatureError};
use crate::app::errors::HandlerError;
use crate::app::reply::{Reply, TemplateRenderer};

pub type HandlerResult = Result<Reply, HandlerError>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// Anything callable with the app state and bound keywords.
///
/// Implemented for every `async fn(S, Kwargs) -> HandlerResult`.
pub trait Handler<S>: Send + Sync + 'static {
    fn call(&self, state: S, kw: Kwargs) -> HandlerFuture;
}

impl<S, F, Fut> Handler<S> for F
where
    F: Fn(S, Kwargs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, state: S, kw: Kwargs) -> HandlerFuture {
        Box::pin(self(state, kw))
    }
}

/// Default cap on bodies read by the binder.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// A handler plus the signature it was registered with.
pub struct RequestHandler<S> {
    name: String,
    signature: Signature,
    handler: Arc<dyn Handler<S>>,
    body_limit: usize,
}

impl<S> Clone for RequestHandler<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            signature: self.signature.clone(),
            handler: Arc::clone(&self.handler),
            body_limit: self.body_limit,
        }
    }
}

impl<S> std::fmt::Debug for RequestHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl<S: Send + 'static> RequestHandler<S> {
    /// Validate the manifest and wrap `handler`.
    pub fn new(
        name: impl Into<String>,
        params: &[Param],
        handler: impl Handler<S>,
    ) -> Result<Self, SignatureError> {
        let name = name.into();
        let signature = Signature::from_params(&name, params)?;
        Ok(Self {
            name,
            signature,
            handler: Arc::new(handler),
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Bind `req` against the signature, call the handler and render its outcome.
    ///
    /// Malformed requests are answered with 400 before the handler runs. Domain
    /// errors become a `{error, data, message}` body with status 200.
    pub async fn process(
        &self,
        state: S,
        renderer: &dyn TemplateRenderer,
        captures: Vec<(String, String)>,
        req: Request,
    ) -> Response {
        let kw = match bind(&self.signature, req, captures, self.body_limit).await {
            Ok(kw) => kw,
            Err(e) => {
                tracing::info!(handler = %self.name, error = %e, "rejected request");
                return e.into_response();
            }
        };

        tracing::debug!(handler = %self.name, args = ?kw.names(), "call with args");

        match self.handler.call(state, kw).await {
            Ok(reply) => reply.render(renderer),
            Err(e) => {
                tracing::info!(handler = %self.name, error = %e, "handler failed");
                e.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{Body, to_bytes};
    use axum::http::{StatusCode, header::CONTENT_TYPE};
    use serde_json::{Value, json};

    use myblog_core::ApiError;

    use super::*;
    use crate::app::reply::JsonPageRenderer;

    #[derive(Clone, Default)]
    struct Calls(Arc<AtomicUsize>);

    impl Calls {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn echo(calls: Calls, kw: Kwargs) -> HandlerResult {
        calls.0.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::Json(Value::Object(kw.values().clone())))
    }

    async fn echo_text(calls: Calls, kw: Kwargs) -> HandlerResult {
        calls.0.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::Json(json!({"a": kw.text("a"), "b": kw.text("b")})))
    }

    async fn rejects_email(_calls: Calls, _kw: Kwargs) -> HandlerResult {
        Err(ApiError::validation("email", "bad format").into())
    }

    fn echo_ab() -> RequestHandler<Calls> {
        RequestHandler::new("echo", &[Param::keyword("a"), Param::keyword("b")], echo).unwrap()
    }

    async fn run(
        handler: &RequestHandler<Calls>,
        calls: &Calls,
        captures: Vec<(String, String)>,
        req: Request,
    ) -> (StatusCode, Value) {
        let res = handler
            .process(calls.clone(), &JsonPageRenderer, captures, req)
            .await;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn query_string_binds_required_keywords() {
        let calls = Calls::default();
        let (status, body) = run(&echo_ab(), &calls, vec![], get("/echo?a=1&b=2")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"a": "1", "b": "2"}));
        assert_eq!(calls.count(), 1);
    }

    #[tokio::test]
    async fn missing_keyword_is_rejected_before_the_handler_runs() {
        let calls = Calls::default();
        let (status, body) = run(&echo_ab(), &calls, vec![], get("/echo?a=1")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_argument");
        assert!(body["message"].as_str().unwrap().contains('b'));
        assert_eq!(calls.count(), 0);
    }

    #[tokio::test]
    async fn json_body_binds_like_the_query_string() {
        let calls = Calls::default();
        let req = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"a": 1, "b": 2}"#))
            .unwrap();
        let (status, body) = run(&echo_ab(), &calls, vec![], req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"a": 1, "b": 2}));
        assert_eq!(calls.count(), 1);

        let as_text = RequestHandler::new(
            "echo_text",
            &[Param::keyword("a"), Param::keyword("b")],
            echo_text,
        )
        .unwrap();
        let json_req = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"a": 1, "b": 2}"#))
            .unwrap();
        let (_, from_json) = run(&as_text, &calls, vec![], json_req).await;
        let (_, from_query) = run(&as_text, &calls, vec![], get("/echo?a=1&b=2")).await;

        assert_eq!(from_json, json!({"a": "1", "b": "2"}));
        assert_eq!(from_json, from_query);
        assert_eq!(calls.count(), 3);
    }

    #[tokio::test]
    async fn post_without_content_type_is_a_client_error() {
        let calls = Calls::default();
        let req = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Body::from("a=1&b=2"))
            .unwrap();
        let (status, body) = run(&echo_ab(), &calls, vec![], req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_content_type");
        assert_eq!(calls.count(), 0);
    }

    #[tokio::test]
    async fn path_capture_fills_named_parameter() {
        let calls = Calls::default();
        let handler = RequestHandler::new("by_id", &[Param::keyword("id")], echo).unwrap();
        let (status, body) = run(
            &handler,
            &calls,
            vec![("id".to_string(), "42".to_string())],
            get("/items/42"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "42"}));
    }

    #[tokio::test]
    async fn domain_error_becomes_a_structured_body() {
        let calls = Calls::default();
        let handler = RequestHandler::new("rejects", &[], rejects_email).unwrap();
        let (status, body) = run(&handler, &calls, vec![], get("/x")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"error": "value:invalid", "data": "email", "message": "bad format"})
        );
    }

    #[test]
    fn invalid_manifest_fails_registration() {
        let err = RequestHandler::<Calls>::new("bad", &[Param::request(), Param::path("id")], echo)
            .unwrap_err();
        assert!(matches!(err, SignatureError::RequestNotLast { .. }));
    }
}
