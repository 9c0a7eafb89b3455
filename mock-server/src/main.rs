use mock_server::Credentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mock_server=info,arango_core=debug")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8529".to_string());
    let credentials = Credentials::new(
        std::env::var("ARANGO_USER").unwrap_or_else(|_| "root".to_string()),
        std::env::var("ARANGO_PASSWORD").unwrap_or_default(),
    );
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, user = %credentials.username, "listening");
    mock_server::run(listener, credentials).await
}
