//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the shared response cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Payload is at or above the per-object cap
    #[error("object of {size} bytes exceeds cache limit of {limit} bytes")]
    ObjectTooLarge { size: usize, limit: usize },

    /// The reader/writer gate was closed
    #[error("cache gate closed")]
    GateClosed(#[from] tokio::sync::AcquireError),
}

// == Proxy Error Enum ==
/// Errors that end a single client exchange.
///
/// None of these affect other connections; each task owns its own failure.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Client closed the connection without sending a request line
    #[error("client sent no request")]
    EmptyRequest,

    /// Request line did not contain a method and a target
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Anything other than GET
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Neither the target nor a Host header named an origin
    #[error("no origin host for target {0:?}")]
    MissingHost(String),

    /// A request or header line ran past the line limit
    #[error("request line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// Opening the origin connection failed
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: String,
        #[source]
        source: io::Error,
    },

    /// Cache failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Socket I/O failure on either side
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProxyError {
    // == Client Status ==
    /// Status line written back to the client for this failure, if any.
    ///
    /// Dropped requests (unsupported method, empty or malformed request line)
    /// get no response at all; the connection is simply closed.
    pub fn client_status(&self) -> Option<&'static str> {
        match self {
            ProxyError::MissingHost(_) | ProxyError::LineTooLong { .. } => Some("400 Bad Request"),
            ProxyError::Connect { .. } => Some("502 Bad Gateway"),
            ProxyError::EmptyRequest
            | ProxyError::MalformedRequestLine(_)
            | ProxyError::UnsupportedMethod(_)
            | ProxyError::Cache(_)
            | ProxyError::Io(_) => None,
        }
    }

    /// Renders the minimal HTTP/1.0 error response for this failure.
    pub fn client_response(&self) -> Option<String> {
        self.client_status().map(|status| {
            let body = format!("{}\n", self);
            format!(
                "HTTP/1.0 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        })
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::ObjectTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::GateClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for a proxied exchange.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_requests_have_no_response() {
        assert!(ProxyError::UnsupportedMethod("POST".into())
            .client_response()
            .is_none());
        assert!(ProxyError::EmptyRequest.client_response().is_none());
        assert!(ProxyError::MalformedRequestLine("GET".into())
            .client_response()
            .is_none());
    }

    #[test]
    fn test_connect_failure_maps_to_bad_gateway() {
        let err = ProxyError::Connect {
            host: "origin".into(),
            port: "80".into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };

        let response = err.client_response().unwrap();
        assert!(response.starts_with("HTTP/1.0 502 Bad Gateway\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.contains("origin:80"));
    }

    #[test]
    fn test_error_response_content_length_matches_body() {
        let response = ProxyError::MissingHost("/x".into())
            .client_response()
            .unwrap();
        let (head, body) = response.split_once("\r\n\r\n").unwrap();

        assert!(head.starts_with("HTTP/1.0 400 Bad Request"));
        assert!(head.contains(&format!("Content-Length: {}", body.len())));
    }
}
