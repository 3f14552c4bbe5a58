//! # rt-server
//!
//! axum JSON API for ResearchTools.
//!
//! Handlers are request-scoped and stateless. They share an
//! `Arc<AppState>` holding the service, config, and optional LLM client.
//! The caller's account is resolved per request by the [`AccountContext`]
//! extractor from `Authorization: Bearer <account_hash>`.

mod access;
pub mod cleanup;
pub mod error;
pub mod extract;
pub mod handlers;
mod router;
pub mod state;

pub use error::ApiError;
pub use extract::AccountContext;
pub use router::router;
pub use state::AppState;

use std::sync::Arc;

use anyhow::Context;

/// Bind, start the cleanup task, and serve until Ctrl-C.
///
/// # Errors
///
/// Fails if the address cannot be bound or the server stops with an error.
pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let cleanup = cleanup::spawn_cleanup_task(Arc::clone(&state));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = cleanup {
        handle.abort();
    }
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
