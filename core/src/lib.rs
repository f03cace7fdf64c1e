//! Client for the Akismet spam-detection API.
//!
//! # Overview
//! Four remote operations (comment check, key verification, spam and ham
//! submission), each a form-encoded POST whose plain-text response is mapped
//! to a typed result or a classified `Error`.
//!
//! # Design
//! - `AkismetClient` is read-only after construction and cheap to clone.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`); the async wrappers run the
//!   round-trip through a pluggable `Transport`.
//! - Every call takes a `RequestContext` so callers can cancel or bound it.
//! - Errors carry a stable `ErrorKind` plus the original cause.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod types;

pub use client::{AkismetClient, Endpoint, SUBMIT_ACK};
pub use config::{ClientConfig, DEFAULT_ENDPOINT_TEMPLATE};
pub use context::RequestContext;
pub use error::{Category, ContextError, Error, ErrorKind, Result};
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{Comment, Form};
pub use tokio_util::sync::CancellationToken;
