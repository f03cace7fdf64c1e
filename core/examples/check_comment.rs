//! Check a sample comment.
//!
//! ```text
//! AKISMET_KEY=... AKISMET_BLOG_URL=http://some-blog.com cargo run --example check_comment
//! ```
//!
//! Set `AKISMET_ENDPOINT_TEMPLATE=http://127.0.0.1:3000/{key}/{endpoint}` to
//! run against the mock server instead.

use std::time::Duration;

use akismet_core::{AkismetClient, ClientConfig, Comment, RequestContext};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = AkismetClient::new(ClientConfig::from_env())?;
    let comment = Comment {
        comment_type: "comment".to_string(),
        comment_author: "viagra-test-123".to_string(),
        ..Comment::new("8.8.8.8", "Mozilla/6.1.6")
    };

    let ctx = RequestContext::with_timeout(Duration::from_secs(10));
    match client.check(&ctx, &comment).await {
        Ok(spam) => info!("is spam: {spam}"),
        Err(e) => {
            error!("got error: {e}");
            info!("treating as spam: {}", e.spam_fallback());
            return Err(e.into());
        }
    }
    Ok(())
}
