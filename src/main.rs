use expense_analysis::{client::BackendClient, router, AppState, Config, Dashboard};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env().inspect_err(|err| error!("invalid configuration: {err}"))?;
    let client = BackendClient::new(&config)?;
    let dashboard = Dashboard::new(client);
    dashboard.mount().await;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("backend at {}", config.backend_url);
    let app = router(AppState::new(config, dashboard.clone()));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dashboard.teardown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
