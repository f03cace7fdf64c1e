//! HTTP transport types and the default async transport.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! and parses an `HttpResponse`; a `Transport` performs the round-trip in
//! between. Transports return every status as data so status interpretation
//! stays in one place.
//!
//! `execute` is async so the client can drop an in-flight call when its
//! `RequestContext` is done; dropping the future closes the connection.

use std::fmt;

/// A POST request described as plain data.
///
/// Every Akismet call is a form-encoded POST, so only URL, headers and body
/// vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Failure inside a `Transport`, before a usable response existed.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be constructed (bad URI, bad header).
    Build(Box<dyn std::error::Error + Send + Sync>),
    /// The request was not answered (DNS, connect, reset).
    Send(Box<dyn std::error::Error + Send + Sync>),
    /// A response arrived but its body could not be read.
    Body(Box<dyn std::error::Error + Send + Sync>),
}

/// Executes requests for the client.
///
/// Implementations are shared between concurrent calls and must be safe for
/// concurrent use. The returned future may be dropped at any await point and
/// must release its connection when that happens.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client, e.g. one with custom TLS or proxy settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(Box::new(e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Build(Box::new(err))
    } else {
        TransportError::Send(Box::new(err))
    }
}
