// Connection handling module
// Serves a single accepted TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Serves HTTP/1.1 with keep-alive, one handler call per request
/// 3. Registers the connection with `graceful` so shutdown can drain it
/// 4. Logs connection-level errors; they never reach other connections
pub fn spawn_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| {
        handler::handle_request(req, Arc::clone(&state), peer_addr)
    });

    let conn = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(io, service);
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
