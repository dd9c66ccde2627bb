//! Stopping the service on process termination signals

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `stop` when the process is asked to terminate
///
/// Listens for SIGTERM and SIGINT on Unix and for Ctrl+C elsewhere. Returns
/// without waiting for a signal if `stop` is cancelled by someone else first.
pub async fn cancel_on_shutdown(stop: CancellationToken) {
    tokio::select! {
        () = stop.cancelled() => return,
        signal = wait_for_signal() => info!(signal, "Shutdown signal received"),
    }
    stop.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    fn register(kind: SignalKind, name: &'static str) -> Option<Signal> {
        signal(kind)
            .inspect_err(|e| warn!(error = %e, signal = name, "Could not register signal handler"))
            .ok()
    }

    async fn next(handler: &mut Option<Signal>) {
        match handler {
            Some(handler) => {
                handler.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    // Registration fails in some sandboxes
    let mut sigterm = register(SignalKind::terminate(), "SIGTERM");
    let mut sigint = register(SignalKind::interrupt(), "SIGINT");
    if sigterm.is_none() && sigint.is_none() {
        return ctrl_c().await;
    }

    tokio::select! {
        () = next(&mut sigterm) => "SIGTERM",
        () = next(&mut sigint) => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without any handler only an external kill stops the process
        warn!(error = %e, "Could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
