//! Error types for the Akismet client.
//!
//! # Design
//! Every failure is an `Error` tagged with an `ErrorKind`. The kind is the
//! stable marker callers match on ("the service rejected my key" vs "the
//! network is down" vs "the service said something we don't understand").
//! The original failure, if any, is kept as `source()` and operation-level
//! context is stacked on top so `Display` reads outermost first, e.g.
//! `error during comment check request: akismet API returned non 200 status code 418`.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Stable category of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No API key was supplied at construction.
    ApiKeyRequired,
    /// No site URL was supplied at construction.
    BlogUrlRequired,
    /// The site URL is not an absolute URL.
    BlogUrlIncorrect,
    /// `user_ip` or `user_agent` is empty.
    MissingField,
    /// A comment timestamp is not RFC 3339.
    InvalidDate,
    /// The endpoint URL could not be built.
    RequestBuild,
    /// The request never produced a response (network failure, cancellation).
    Transport,
    /// The service answered with something other than 200.
    NonOkStatus,
    /// The response body could not be read.
    ResponseBody,
    /// A 200 response whose body is outside the endpoint's vocabulary.
    UnusualResponse,
}

/// Coarse grouping of `ErrorKind`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Configuration,
    Validation,
    Transport,
    Protocol,
}

impl ErrorKind {
    pub fn category(self) -> Category {
        match self {
            ErrorKind::ApiKeyRequired
            | ErrorKind::BlogUrlRequired
            | ErrorKind::BlogUrlIncorrect => Category::Configuration,
            ErrorKind::MissingField | ErrorKind::InvalidDate => Category::Validation,
            ErrorKind::RequestBuild
            | ErrorKind::Transport
            | ErrorKind::NonOkStatus
            | ErrorKind::ResponseBody => Category::Transport,
            ErrorKind::UnusualResponse => Category::Protocol,
        }
    }
}

/// Why a `RequestContext` stopped an in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Error returned by every fallible client operation.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
    status: Option<u16>,
    response: Option<String>,
    source: Option<Cause>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            status: None,
            response: None,
            source: None,
        }
    }

    fn with_source(mut self, source: impl Into<Cause>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn api_key_required() -> Self {
        Self::new(ErrorKind::ApiKeyRequired, "API key is required")
    }

    pub(crate) fn blog_url_required() -> Self {
        Self::new(ErrorKind::BlogUrlRequired, "blog url is required")
    }

    pub(crate) fn blog_url_incorrect(cause: url::ParseError) -> Self {
        Self::new(ErrorKind::BlogUrlIncorrect, "incorrect blog url").with_source(cause)
    }

    pub(crate) fn missing_field(field: &str) -> Self {
        Self::new(ErrorKind::MissingField, format!("field {field} is required"))
    }

    pub(crate) fn invalid_date(which: &str, cause: impl Into<Cause>) -> Self {
        Self::new(ErrorKind::InvalidDate, format!("cannot parse {which} date")).with_source(cause)
    }

    pub(crate) fn request_build(cause: impl Into<Cause>) -> Self {
        Self::new(ErrorKind::RequestBuild, "error creating request").with_source(cause)
    }

    pub(crate) fn transport(cause: impl Into<Cause>) -> Self {
        Self::new(ErrorKind::Transport, "cannot perform request").with_source(cause)
    }

    pub(crate) fn cancelled(reason: ContextError) -> Self {
        Self::transport(reason)
    }

    pub(crate) fn non_ok_status(status: u16) -> Self {
        let mut err = Self::new(
            ErrorKind::NonOkStatus,
            format!("akismet API returned non 200 status code {status}"),
        );
        err.status = Some(status);
        err
    }

    pub(crate) fn response_body(cause: impl Into<Cause>) -> Self {
        Self::new(ErrorKind::ResponseBody, "cannot read response body").with_source(cause)
    }

    pub(crate) fn unusual_response(body: &str) -> Self {
        let mut err = Self::new(
            ErrorKind::UnusualResponse,
            format!("got unusual response: '{body}'"),
        );
        err.response = Some(body.to_string());
        err
    }

    /// Push an outer context message onto the error.
    pub fn context(mut self, message: impl Into<String>) -> Self {
        self.context.insert(0, message.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// HTTP status for `NonOkStatus` errors.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Literal response body for `UnusualResponse` errors.
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// True when the call was stopped by its `RequestContext`.
    pub fn is_cancelled(&self) -> bool {
        self.context_error().is_some()
    }

    pub fn context_error(&self) -> Option<ContextError> {
        self.source
            .as_deref()
            .and_then(|s| s.downcast_ref::<ContextError>())
            .copied()
    }

    /// Verdict to assume when a comment check fails.
    ///
    /// Anything that got as far as talking to the service is treated as spam;
    /// configuration and validation failures never reached it and report `false`.
    pub fn spam_fallback(&self) -> bool {
        matches!(self.kind.category(), Category::Transport | Category::Protocol)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{ctx}: ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
    }
}
