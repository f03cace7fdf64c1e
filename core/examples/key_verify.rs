//! Verify an API key.
//!
//! ```text
//! AKISMET_KEY=... AKISMET_BLOG_URL=http://some-blog.com cargo run --example key_verify
//! ```

use std::time::Duration;

use akismet_core::{AkismetClient, ClientConfig, RequestContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = AkismetClient::new(ClientConfig::from_env())?;
    let verified = client
        .verify(&RequestContext::with_timeout(Duration::from_secs(10)))
        .await?;
    info!("key verification: {verified}");
    Ok(())
}
