//! Per-connection request pipeline.
//!
//! One request, one response, then the connection is done:
//!
//! ```text
//! request line -> GET? -> cache lookup --hit--> write payload
//!                              |
//!                             miss -> parse target -> rewrite headers
//!                                  -> connect origin -> relay -> cache insert
//! ```

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::error::{ProxyError, Result};
use crate::proxy::line::{read_line, MAX_LINE};
use crate::proxy::relay::relay;
use crate::proxy::request::{format_request, skip_headers, RequestLine};
use crate::proxy::url::ParsedUrl;

// == Exchange ==
/// How a completed exchange was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Served from the cache without contacting the origin
    CacheHit { bytes: usize },
    /// Relayed from the origin
    Relayed { bytes: usize, cached: bool },
}

// == Serve ==
/// Runs one exchange on `stream`.
///
/// Failures that have a client-visible form (see
/// [`ProxyError::client_response`]) are answered before the error is
/// returned. Everything else just ends the exchange; closing the stream is
/// left to the caller.
pub async fn serve<S>(stream: S, cache: &SharedCache) -> Result<Exchange>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut client = BufReader::new(stream);

    let outcome = process(&mut client, cache).await;

    if let Err(err) = &outcome {
        if let Some(response) = err.client_response() {
            if let Err(write_err) = client.write_all(response.as_bytes()).await {
                debug!("failed to send error response: {}", write_err);
            }
        }
    }
    if let Err(err) = client.flush().await {
        debug!("failed to flush client: {}", err);
    }

    outcome
}

async fn process<S>(client: &mut BufReader<S>, cache: &SharedCache) -> Result<Exchange>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    if read_line(client, &mut buf, MAX_LINE).await? == 0 {
        return Err(ProxyError::EmptyRequest);
    }
    let request = RequestLine::from_bytes(&buf)?;
    debug!(method = %request.method, target = %request.target, version = %request.version, "request");

    if !request.is_get() {
        return Err(ProxyError::UnsupportedMethod(request.method));
    }

    if let Some(payload) = cache.lookup(&request.target).await? {
        client.write_all(&payload).await?;
        info!("Cache hit: sent {} bytes to client", payload.len());
        // Unread headers would turn the close into a reset
        if let Err(err) = skip_headers(client).await {
            debug!("ignoring unread request headers: {}", err);
        }
        return Ok(Exchange::CacheHit {
            bytes: payload.len(),
        });
    }

    let url = ParsedUrl::parse(&request.target);
    let upstream = format_request(client, &url).await?;
    let (host, port) = upstream.origin(&url, &request.target)?;

    let mut origin = connect(&host, &port).await?;
    origin.write_all(upstream.as_bytes()).await?;
    debug!(%host, %port, "forwarded request upstream");

    let mut origin = BufReader::new(origin);
    let response = relay(&mut origin, client, cache.max_object_size()).await?;
    let bytes = response.total();
    info!("Proxy sent {} bytes to client", bytes);

    let cached = match response.into_cacheable() {
        Some(payload) => {
            cache.insert(&request.target, payload).await?;
            true
        }
        None => false,
    };

    Ok(Exchange::Relayed { bytes, cached })
}

async fn connect(host: &str, port: &str) -> Result<TcpStream> {
    let connect_error = |source| ProxyError::Connect {
        host: host.to_string(),
        port: port.to_string(),
        source,
    };

    let port_number: u16 = port.parse().map_err(|_| {
        connect_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "invalid port",
        ))
    })?;

    TcpStream::connect((host, port_number))
        .await
        .map_err(connect_error)
}
