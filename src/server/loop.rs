// Server loop module
// Accepts connections until the shutdown future resolves, then drains them

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::spawn_connection;
use crate::config::AppState;
use crate::logger;

/// Upper bound on how long shutdown waits for open connections
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept loop for the asset server
///
/// Every accepted connection runs in its own task. Once `shutdown` resolves
/// the listener is dropped, idle keep-alive connections are closed and
/// responses already in flight are written out. Returns when every
/// connection has finished or `DRAIN_TIMEOUT` has passed.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, Arc::clone(&state), &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown();
                break;
            }
        }
    }

    drop(listener);

    tokio::select! {
        () = graceful.shutdown() => logger::log_drained(),
        () = tokio::time::sleep(DRAIN_TIMEOUT) => logger::log_warning(&format!(
            "Connections still open after {}s, closing them",
            DRAIN_TIMEOUT.as_secs()
        )),
    }
}
