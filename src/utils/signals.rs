//! Signal handling for graceful shutdown

use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT, SIGQUIT) and return it
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();

    let signal = signals.next().await.unwrap_or(SIGTERM);
    info!("Received signal: {}", signal);
    handle.close();
    Ok(signal)
}
