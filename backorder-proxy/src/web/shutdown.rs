//! Graceful shutdown on process signals.

use std::fmt;
use std::future::{pending, Future};

use tokio::signal;
use tracing::{error, info};

/// The signal that ended the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        })
    }
}

/// Resolve with whichever of the two signal futures finishes first.
pub async fn wait_for_shutdown<I, T>(interrupt: I, terminate: T) -> ShutdownSignal
where
    I: Future<Output = ()>,
    T: Future<Output = ()>,
{
    let received = tokio::select! {
        _ = interrupt => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    };
    info!(signal = %received, "shutdown_signal_received");
    received
}

/// Wait for Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still can.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "sigint_handler_install_failed");
            pending::<()>().await;
        }
    };

    wait_for_shutdown(interrupt, terminate()).await;
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!(error = %e, "sigterm_handler_install_failed");
            pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    pending::<()>().await;
}
