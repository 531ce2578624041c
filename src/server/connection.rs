// Connection handling module
// Accepts connections and serves each one on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

use crate::config::PerformanceConfig;
use crate::handler;
use crate::hosting::BundleHost;
use crate::logger;

/// Accept connections until the listener fails
pub async fn serve(
    listener: TcpListener,
    host: Arc<BundleHost>,
    performance: PerformanceConfig,
) -> std::io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        logger::log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
        handle_connection(stream, peer_addr, Arc::clone(&host), performance.clone());
    }
}

/// Handle a single connection in a spawned task.
///
/// The whole connection is bounded by `read_timeout`, keep-alive included.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    host: Arc<BundleHost>,
    performance: PerformanceConfig,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = Duration::from_secs(performance.read_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&host), peer_addr)),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}
