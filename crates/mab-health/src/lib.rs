//! Liveness listener for the hosting platform's health checks.
//!
//! Every request, whatever its method or path, gets `200 OK` with body `OK`.

use std::net::{Ipv4Addr, SocketAddr};

use axum::{http::StatusCode, Router};
use tokio::task::JoinHandle;
use tracing::{error, info};

async fn alive() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

pub fn router() -> Router {
    Router::new().fallback(alive)
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "liveness endpoint listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Run [`serve`] on its own task; a failure is logged and never takes the bot down.
pub fn spawn(port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(port).await {
            error!(port, error = %e, "liveness endpoint stopped");
        }
    })
}
