// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop on the current `LocalSet` until `shutdown` resolves.
///
/// After shutdown, open connections get up to `write_timeout` seconds to
/// finish before the loop returns.
pub async fn start_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                break;
            }
        }
    }

    drop(listener);
    let grace = Duration::from_secs(state.config.performance.write_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;

    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {}s, closing",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
}
