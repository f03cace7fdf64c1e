//! Akismet API client.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! request shaping and response interpretation stay deterministic and
//! testable without a network. The async operations (`check`, `verify`,
//! `submit_spam`, `submit_ham`) glue the two halves together through the
//! configured `Transport`, racing the round-trip against the caller's
//! `RequestContext`. When the context wins, the in-flight future is dropped
//! and its connection closed.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
use crate::types::{Comment, Form};

/// Acknowledgement body returned by submit-spam and submit-ham.
pub const SUBMIT_ACK: &str = "Thanks for making the web a better place.";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The four remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CommentCheck,
    VerifyKey,
    SubmitSpam,
    SubmitHam,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::CommentCheck,
        Endpoint::VerifyKey,
        Endpoint::SubmitSpam,
        Endpoint::SubmitHam,
    ];

    /// Path segment on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::CommentCheck => "comment-check",
            Endpoint::VerifyKey => "verify-key",
            Endpoint::SubmitSpam => "submit-spam",
            Endpoint::SubmitHam => "submit-ham",
        }
    }

    fn failure_context(self) -> &'static str {
        match self {
            Endpoint::CommentCheck => "error during comment check request",
            Endpoint::VerifyKey => "error during key verification request",
            Endpoint::SubmitSpam => "error during spam submission request",
            Endpoint::SubmitHam => "error during ham submission request",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client bound to one API key and one site.
///
/// Read-only after construction; clones share the transport.
#[derive(Clone)]
pub struct AkismetClient {
    key: String,
    blog_url: String,
    endpoint_template: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for AkismetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AkismetClient")
            .field("key", &"<redacted>")
            .field("blog_url", &self.blog_url)
            .field("endpoint_template", &self.endpoint_template)
            .field("transport", &self.transport)
            .finish()
    }
}

impl AkismetClient {
    /// Validate `config` and build a client. Performs no I/O.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.key.is_empty() {
            return Err(Error::api_key_required());
        }
        if config.blog_url.is_empty() {
            return Err(Error::blog_url_required());
        }
        Url::parse(&config.blog_url).map_err(Error::blog_url_incorrect)?;

        let endpoint_template = config.endpoint_template().to_string();
        let transport = config
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        Ok(Self {
            key: config.key,
            blog_url: config.blog_url,
            endpoint_template,
            transport,
        })
    }

    pub fn blog_url(&self) -> &str {
        &self.blog_url
    }

    /// Fully-qualified URL for `endpoint`.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        self.endpoint_template
            .replace("{key}", &self.key)
            .replace("{endpoint}", endpoint.as_str())
    }

    pub fn build_check(&self, comment: &Comment) -> Result<HttpRequest> {
        self.build_comment_request(Endpoint::CommentCheck, comment)
    }

    pub fn build_verify(&self) -> Result<HttpRequest> {
        let mut form = Form::new();
        form.insert("key", self.key.as_str());
        self.build_request(Endpoint::VerifyKey, form)
    }

    pub fn build_submit_spam(&self, comment: &Comment) -> Result<HttpRequest> {
        self.build_comment_request(Endpoint::SubmitSpam, comment)
    }

    pub fn build_submit_ham(&self, comment: &Comment) -> Result<HttpRequest> {
        self.build_comment_request(Endpoint::SubmitHam, comment)
    }

    /// `true` when Akismet considers the comment spam.
    pub fn parse_check(&self, response: HttpResponse) -> Result<bool> {
        let body = accept(Endpoint::CommentCheck, response)?;
        match body.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(unusual(Endpoint::CommentCheck, other)),
        }
    }

    /// `true` when the key is valid for the configured site.
    pub fn parse_verify(&self, response: HttpResponse) -> Result<bool> {
        let body = accept(Endpoint::VerifyKey, response)?;
        match body.as_str() {
            "valid" => Ok(true),
            "invalid" => Ok(false),
            other => Err(unusual(Endpoint::VerifyKey, other)),
        }
    }

    pub fn parse_submit_spam(&self, response: HttpResponse) -> Result<()> {
        parse_submission(Endpoint::SubmitSpam, response)
    }

    pub fn parse_submit_ham(&self, response: HttpResponse) -> Result<()> {
        parse_submission(Endpoint::SubmitHam, response)
    }

    /// Ask Akismet whether `comment` is spam.
    ///
    /// On error, `Error::spam_fallback` gives the verdict to assume.
    pub async fn check(&self, ctx: &RequestContext, comment: &Comment) -> Result<bool> {
        let request = self.build_check(comment)?;
        let response = self.send(ctx, Endpoint::CommentCheck, request).await?;
        self.parse_check(response)
    }

    /// Check that the API key is valid.
    pub async fn verify(&self, ctx: &RequestContext) -> Result<bool> {
        let request = self.build_verify()?;
        let response = self.send(ctx, Endpoint::VerifyKey, request).await?;
        self.parse_verify(response)
    }

    /// Report a comment Akismet missed as spam.
    pub async fn submit_spam(&self, ctx: &RequestContext, comment: &Comment) -> Result<()> {
        let request = self.build_submit_spam(comment)?;
        let response = self.send(ctx, Endpoint::SubmitSpam, request).await?;
        self.parse_submit_spam(response)
    }

    /// Report a comment wrongly flagged as spam.
    pub async fn submit_ham(&self, ctx: &RequestContext, comment: &Comment) -> Result<()> {
        let request = self.build_submit_ham(comment)?;
        let response = self.send(ctx, Endpoint::SubmitHam, request).await?;
        self.parse_submit_ham(response)
    }

    fn build_comment_request(&self, endpoint: Endpoint, comment: &Comment) -> Result<HttpRequest> {
        comment
            .validate()
            .map_err(|e| e.context("error validating comment"))?;
        self.build_request(endpoint, comment.to_form())
    }

    fn build_request(&self, endpoint: Endpoint, mut form: Form) -> Result<HttpRequest> {
        form.insert("blog", self.blog_url.as_str());
        let url = Url::parse(&self.endpoint_url(endpoint))
            .map_err(|e| Error::request_build(e).context(endpoint.failure_context()))?;
        Ok(HttpRequest {
            url: url.into(),
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: form.encode(),
        })
    }

    /// Run `request` through the transport, dropping it when `ctx` is done.
    async fn send(
        &self,
        ctx: &RequestContext,
        endpoint: Endpoint,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        if let Some(reason) = ctx.err() {
            return Err(Error::cancelled(reason).context(endpoint.failure_context()));
        }

        debug!(%endpoint, blog = %self.blog_url, "sending akismet request");
        let outcome = tokio::select! {
            reason = ctx.done() => {
                warn!(%endpoint, %reason, "akismet request abandoned");
                return Err(Error::cancelled(reason).context(endpoint.failure_context()));
            }
            outcome = self.transport.execute(&request) => outcome,
        };

        let response =
            outcome.map_err(|e| transport_error(e).context(endpoint.failure_context()))?;
        debug!(%endpoint, status = response.status, "akismet response received");
        Ok(response)
    }
}

/// Reject non-200 responses and hand back the body.
fn accept(endpoint: Endpoint, response: HttpResponse) -> Result<String> {
    if response.status != 200 {
        warn!(%endpoint, status = response.status, "akismet returned non-OK status");
        return Err(Error::non_ok_status(response.status).context(endpoint.failure_context()));
    }
    Ok(response.body)
}

fn parse_submission(endpoint: Endpoint, response: HttpResponse) -> Result<()> {
    let body = accept(endpoint, response)?;
    if body == SUBMIT_ACK {
        return Ok(());
    }
    Err(unusual(endpoint, &body))
}

fn unusual(endpoint: Endpoint, body: &str) -> Error {
    warn!(%endpoint, body, "unusual akismet response");
    Error::unusual_response(body)
}

fn transport_error(err: TransportError) -> Error {
    match err {
        TransportError::Build(e) => Error::request_build(e),
        TransportError::Send(e) => Error::transport(e),
        TransportError::Body(e) => Error::response_body(e),
    }
}
