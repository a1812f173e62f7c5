use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use ff_sandbox_core::TemplateRegistry;

use crate::output;
use crate::server;

/// Compile the corpus and serve it over HTTP until Ctrl-C.
///
/// A corpus that fails to compile stops the process before the listener is bound.
pub async fn run(bind: SocketAddr) -> Result<()> {
    output::print_header("ff-sandbox serve");

    output::print_step(1, 2, "Compiling template corpus...");
    let registry = Arc::new(TemplateRegistry::bundled().context("bundled template corpus is invalid")?);
    for operation in registry.operations() {
        output::print_route(operation);
    }

    output::print_step(2, 2, &format!("Listening on http://{bind}"));
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(%bind, "serving templates");

    axum::serve(listener, server::build_router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    output::print_success("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
