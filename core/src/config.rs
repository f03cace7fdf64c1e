//! Client configuration.

use std::sync::Arc;

use crate::http::Transport;

/// Production endpoint. `{key}` and `{endpoint}` are substituted per call.
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://{key}.rest.akismet.com/1.1/{endpoint}";

/// Everything needed to build an `AkismetClient`.
///
/// `key` and `blog_url` are required; the rest default to the production
/// endpoint and a pooled `ReqwestTransport`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub key: String,
    /// Site the comments belong to, absolute with scheme.
    pub blog_url: String,
    /// Overrides `DEFAULT_ENDPOINT_TEMPLATE`, e.g. to target a proxy.
    pub endpoint_template: Option<String>,
    /// Overrides the default transport.
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    pub fn new(key: impl Into<String>, blog_url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            blog_url: blog_url.into(),
            ..Self::default()
        }
    }

    /// Read `AKISMET_KEY`, `AKISMET_BLOG_URL` and `AKISMET_ENDPOINT_TEMPLATE`.
    ///
    /// Unset required variables are left empty so client construction
    /// reports them.
    pub fn from_env() -> Self {
        Self {
            key: std::env::var("AKISMET_KEY").unwrap_or_default(),
            blog_url: std::env::var("AKISMET_BLOG_URL").unwrap_or_default(),
            endpoint_template: std::env::var("AKISMET_ENDPOINT_TEMPLATE").ok(),
            transport: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = Some(template.into());
        self
    }

    pub(crate) fn endpoint_template(&self) -> &str {
        self.endpoint_template
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT_TEMPLATE)
    }
}
