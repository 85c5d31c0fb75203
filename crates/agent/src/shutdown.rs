//! Ctrl-c handling for the binary.

use std::future::Future;
use std::io;

/// Resolves once `signal` fires. A signal source that fails to install
/// never resolves, so a broken handler cannot stop the bot.
pub async fn wait_for<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for ctrl-c; running until stopped");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves on ctrl-c.
pub async fn ctrl_c() {
    wait_for(tokio::signal::ctrl_c()).await
}
