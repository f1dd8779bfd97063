//! Proxy Module
//!
//! Request-target parsing, header rewriting, response relay and the
//! per-connection pipeline that ties them to the shared cache.

pub mod line;
pub mod pipeline;
pub mod relay;
pub mod request;
pub mod url;

pub use pipeline::{serve, Exchange};
pub use relay::ResponseBuffer;
pub use request::{
    format_request, skip_headers, RequestFormatter, RequestLine, UpstreamRequest,
    DEFAULT_USER_AGENT,
};
pub use url::ParsedUrl;
