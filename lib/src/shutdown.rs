//! Translate SIGINT/SIGTERM into a cancelled token.

use log::{error, info};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

/// Spawn a task that cancels `token` on the first SIGINT or SIGTERM.
///
/// Once installed, these signals no longer kill the process; the owner of
/// `token` is expected to notice the cancellation and exit on its own.
pub fn cancel_on_signal(token: CancellationToken) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to install SIGTERM handler: {e}");
            return;
        }
    };
    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to install SIGINT handler: {e}");
            return;
        }
    };

    tokio::spawn(async move {
        tokio::select! {
            _ = terminate.recv() => info!("received SIGTERM, shutting down"),
            _ = interrupt.recv() => info!("received SIGINT, shutting down"),
            _ = token.cancelled() => return,
        }
        token.cancel();
    });
}
