// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Interval at which active connections are rechecked while draining
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `state.shutdown` is notified
///
/// After shutdown the listener is closed immediately and in-flight
/// connections get up to the shutdown grace period to finish.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(state.active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + state.config.shutdown_grace();
    while state.active_connections.load(Ordering::SeqCst) > 0
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(DRAIN_POLL).await;
    }

    logger::log_shutdown_complete(state.active_connections.load(Ordering::SeqCst));
    Ok(())
}
