use mock_server::MockState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_server=info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let keys = std::env::var("AKISMET_MOCK_KEYS")
        .unwrap_or_else(|_| mock_server::DEFAULT_KEY.to_string());
    let state = MockState::with_keys(keys.split(',').map(str::trim).filter(|k| !k.is_empty()));

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    mock_server::run(listener, state).await
}
