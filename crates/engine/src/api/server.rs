use anyhow::Result;
use log::info;

use super::routes::create_router;
use super::AppState;

pub async fn start_server(addr: &str, state: AppState) -> Result<()> {
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Wello engine listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down API server...");
}
