//! Handler signature descriptor.
//!
//! Handlers declare what they accept with a small manifest of [`Param`]s. The
//! manifest is validated once, at registration, and summarised into a
//! [`Signature`] that drives extraction for every request.

use std::borrow::Cow;
use std::collections::BTreeSet;

use thiserror::Error;

/// Reserved key under which the raw request is handed to handlers.
pub const REQUEST_PARAM: &str = "request";

/// Name given to the open-ended keyword bag.
pub const REST_PARAM: &str = "kw";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Positional; only ever filled from path captures.
    Path,
    /// Keyword-only. `required` is false when the handler has a default.
    Keyword { required: bool },
    /// Accepts any keyword.
    Rest,
    /// The request itself.
    Request,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: Cow<'static, str>,
    kind: ParamKind,
}

impl Param {
    pub fn path(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Path,
        }
    }

    pub fn keyword(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Keyword { required: true },
        }
    }

    pub fn optional(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Keyword { required: false },
        }
    }

    pub fn rest() -> Self {
        Self {
            name: Cow::Borrowed(REST_PARAM),
            kind: ParamKind::Rest,
        }
    }

    pub fn request() -> Self {
        Self {
            name: Cow::Borrowed(REQUEST_PARAM),
            kind: ParamKind::Request,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("{handler}: parameter names must not be empty")]
    EmptyName { handler: String },

    #[error("{handler}: parameter '{name}' declared more than once")]
    DuplicateName { handler: String, name: String },

    #[error("{handler}: request parameter declared more than once")]
    DuplicateRequest { handler: String },

    #[error("{handler}: positional parameter '{name}' follows the request parameter")]
    RequestNotLast { handler: String, name: String },
}

/// What a handler accepts, derived from its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    has_request_param: bool,
    has_var_keyword_param: bool,
    /// Keyword-only names, required or not, in declaration order.
    named_params: Vec<String>,
    /// Keyword-only names without a default.
    required_params: BTreeSet<String>,
    path_params: Vec<String>,
}

impl Signature {
    /// Validate `params` and summarise them.
    ///
    /// The request parameter may only be followed by keyword-only or rest
    /// parameters; a positional parameter after it is rejected.
    pub fn from_params(handler: &str, params: &[Param]) -> Result<Self, SignatureError> {
        let mut sig = Signature::default();
        let mut seen = BTreeSet::new();

        for param in params {
            let name = param.name();
            if name.is_empty() {
                return Err(SignatureError::EmptyName {
                    handler: handler.to_string(),
                });
            }

            match param.kind() {
                ParamKind::Request => {
                    if sig.has_request_param {
                        return Err(SignatureError::DuplicateRequest {
                            handler: handler.to_string(),
                        });
                    }
                    sig.has_request_param = true;
                }
                ParamKind::Path if sig.has_request_param => {
                    return Err(SignatureError::RequestNotLast {
                        handler: handler.to_string(),
                        name: name.to_string(),
                    });
                }
                ParamKind::Path => sig.path_params.push(name.to_string()),
                ParamKind::Keyword { required } => {
                    sig.named_params.push(name.to_string());
                    if required {
                        sig.required_params.insert(name.to_string());
                    }
                }
                ParamKind::Rest => sig.has_var_keyword_param = true,
            }

            if !seen.insert(name.to_string()) {
                return Err(SignatureError::DuplicateName {
                    handler: handler.to_string(),
                    name: name.to_string(),
                });
            }
        }

        Ok(sig)
    }

    pub fn has_request_param(&self) -> bool {
        self.has_request_param
    }

    pub fn has_var_keyword_param(&self) -> bool {
        self.has_var_keyword_param
    }

    pub fn named_params(&self) -> &[String] {
        &self.named_params
    }

    pub fn required_params(&self) -> &BTreeSet<String> {
        &self.required_params
    }

    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Whether the request body / query string is worth reading at all.
    pub fn needs_keywords(&self) -> bool {
        self.has_var_keyword_param || !self.named_params.is_empty() || !self.required_params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_only_handler_needs_keywords() {
        let sig = Signature::from_params("h", &[Param::keyword("a"), Param::optional("b")]).unwrap();

        assert!(sig.needs_keywords());
        assert!(!sig.has_var_keyword_param());
        assert!(!sig.has_request_param());
        assert_eq!(sig.named_params(), ["a".to_string(), "b".to_string()]);
        assert_eq!(sig.required_params().iter().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn path_and_request_only_handler_skips_extraction() {
        let sig = Signature::from_params("h", &[Param::path("id"), Param::request()]).unwrap();

        assert!(!sig.needs_keywords());
        assert!(sig.has_request_param());
        assert_eq!(sig.path_params(), ["id".to_string()]);
    }

    #[test]
    fn rest_param_alone_needs_keywords() {
        let sig = Signature::from_params("h", &[Param::rest()]).unwrap();
        assert!(sig.needs_keywords());
        assert!(sig.named_params().is_empty());
    }

    #[test]
    fn keywords_may_follow_request() {
        let sig = Signature::from_params(
            "h",
            &[Param::request(), Param::keyword("name"), Param::rest()],
        )
        .unwrap();
        assert!(sig.has_request_param());
        assert!(sig.has_var_keyword_param());
    }

    #[test]
    fn positional_after_request_is_rejected() {
        let err = Signature::from_params("h", &[Param::request(), Param::path("id")]).unwrap_err();
        assert_eq!(
            err,
            SignatureError::RequestNotLast {
                handler: "h".into(),
                name: "id".into()
            }
        );
    }

    #[test]
    fn duplicates_and_empty_names_are_rejected() {
        assert!(matches!(
            Signature::from_params("h", &[Param::keyword("a"), Param::optional("a")]),
            Err(SignatureError::DuplicateName { .. })
        ));
        assert!(matches!(
            Signature::from_params("h", &[Param::request(), Param::request()]),
            Err(SignatureError::DuplicateRequest { .. })
        ));
        assert!(matches!(
            Signature::from_params("h", &[Param::keyword("")]),
            Err(SignatureError::EmptyName { .. })
        ));
        // `request` is reserved for the request parameter.
        assert!(matches!(
            Signature::from_params("h", &[Param::request(), Param::keyword("request")]),
            Err(SignatureError::DuplicateName { .. })
        ));
    }

    #[test]
    fn empty_manifest_is_valid() {
        let sig = Signature::from_params("h", &[]).unwrap();
        assert!(!sig.needs_keywords());
    }
}
