//! Signal handling for graceful shutdown

use anyhow::Result;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Resolve once SIGTERM is raised; never resolves if the handler cannot be registered
#[cfg(unix)]
async fn sigterm() {
    use signal_hook::consts::SIGTERM;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let flag = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(SIGTERM, flag.clone()) {
        error!("Failed to register SIGTERM handler: {}", e);
        std::future::pending::<()>().await;
    }

    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    info!("SIGTERM signal received");
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}

/// Setup signal handlers for graceful shutdown
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C signal: {}", e);
                    sigterm().await;
                }
            },
            _ = sigterm() => {}
        }
        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}
