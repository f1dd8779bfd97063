//! Accept loop.
//!
//! Spawns one detached task per accepted connection. Tasks share only the
//! cache and end after their single exchange.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::SharedCache;
use crate::error::ProxyError;
use crate::proxy::{serve, Exchange};

/// Accepts connections on `listener` until `shutdown` resolves.
///
/// In-flight exchanges are not waited for; each finishes on its own.
pub async fn run<F>(listener: TcpListener, cache: Arc<SharedCache>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("Accepted connection from ({} {})", peer.ip(), peer.port());
                    let cache = cache.clone();
                    tokio::spawn(
                        handle_connection(stream, peer, cache).instrument(info_span!("conn", %peer)),
                    );
                }
                Err(err) => warn!("accept failed: {}", err),
            },
            _ = &mut shutdown => {
                info!("Stopped accepting connections");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, cache: Arc<SharedCache>) {
    let mut stream = stream;

    match serve(&mut stream, &cache).await {
        Ok(Exchange::CacheHit { bytes }) => debug!(bytes, "served from cache"),
        Ok(Exchange::Relayed { bytes, cached }) => debug!(bytes, cached, "relayed from origin"),
        Err(ProxyError::UnsupportedMethod(method)) => {
            info!("Unsupported method: {}", method)
        }
        Err(ProxyError::EmptyRequest) => debug!("client closed without a request"),
        Err(err) => warn!("exchange with {} failed: {}", peer, err),
    }

    if let Err(err) = stream.shutdown().await {
        debug!("shutdown failed: {}", err);
    }
}
