//! # OS termination signals for the driver.
//!
//! Used by [`Driver`](crate::Driver) when `SchedulerConfig::handle_signals` is set.
//!
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

/// Completes when the process receives a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives a termination signal.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Waits for a signal if `enabled`, otherwise never completes.
///
/// A failed registration is logged and treated as "no signal".
pub async fn signal_or_pending(enabled: bool) {
    if enabled {
        match wait_for_shutdown_signal().await {
            Ok(()) => return,
            Err(err) => tracing::warn!(error = %err, "signal registration failed"),
        }
    }
    std::future::pending::<()>().await
}
