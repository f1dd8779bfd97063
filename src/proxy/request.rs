//! Client request line parsing and upstream request rewriting.

use tokio::io::AsyncBufRead;

use crate::error::{ProxyError, Result};
use crate::proxy::line::{read_line, MAX_LINE};
use crate::proxy::url::{ParsedUrl, DEFAULT_PORT};

const CONNECTION_CLOSE: &str = "Connection: close\r\n";
const PROXY_CONNECTION_CLOSE: &str = "Proxy-Connection: close\r\n";

/// User-Agent sent upstream in place of the client's.
pub const DEFAULT_USER_AGENT: &str =
    "User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3\r\n";

/// Client headers replaced by the fixed overrides above.
const OVERRIDDEN_HEADERS: [&[u8]; 3] = [b"connection:", b"proxy-connection:", b"user-agent:"];

// == Request Line ==
/// First line of the client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    /// Raw request target, also the cache key
    pub target: String,
    /// May be empty if the client omitted it
    pub version: String,
}

impl RequestLine {
    /// Splits a request line on whitespace. Method and target are required.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(method), Some(target)) => Ok(Self {
                method: method.to_string(),
                target: target.to_string(),
                version: fields.next().unwrap_or_default().to_string(),
            }),
            _ => Err(ProxyError::MalformedRequestLine(line.trim_end().to_string())),
        }
    }

    /// Parses a raw request line. A line that is not UTF-8 is malformed;
    /// request targets are ASCII on the wire.
    pub fn from_bytes(line: &[u8]) -> Result<Self> {
        match std::str::from_utf8(line) {
            Ok(line) => Self::parse(line),
            Err(_) => Err(ProxyError::MalformedRequestLine(
                String::from_utf8_lossy(line).trim_end().to_string(),
            )),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

fn has_prefix_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn is_blank_line(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

// == Request Formatter ==
/// Collects client header lines and renders the upstream request.
///
/// Lines are kept as raw bytes; only the header name is inspected.
#[derive(Debug, Default)]
pub struct RequestFormatter {
    host_header: Option<Vec<u8>>,
    other_headers: Vec<Vec<u8>>,
}

impl RequestFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw header line, terminator included. Returns true once the
    /// blank line ending the header block has been seen.
    pub fn push_line(&mut self, line: &[u8]) -> bool {
        if is_blank_line(line) {
            return true;
        }

        if has_prefix_ignore_case(line, b"host:") {
            self.host_header = Some(line.to_vec());
        } else if !OVERRIDDEN_HEADERS
            .iter()
            .any(|name| has_prefix_ignore_case(line, name))
        {
            self.other_headers.push(line.to_vec());
        }
        false
    }

    /// Renders the canonical HTTP/1.0 request for `url`.
    ///
    /// Header order: request line, Host, the three fixed overrides, then the
    /// remaining client headers in arrival order, then the blank line.
    pub fn finish(self, url: &ParsedUrl) -> UpstreamRequest {
        let host_header = self
            .host_header
            .unwrap_or_else(|| format!("Host: {}\r\n", url.hostname).into_bytes());

        let mut bytes = format!("GET {} HTTP/1.0\r\n", url.request_path()).into_bytes();
        bytes.extend_from_slice(&host_header);
        bytes.extend_from_slice(CONNECTION_CLOSE.as_bytes());
        bytes.extend_from_slice(PROXY_CONNECTION_CLOSE.as_bytes());
        bytes.extend_from_slice(DEFAULT_USER_AGENT.as_bytes());
        for header in &self.other_headers {
            bytes.extend_from_slice(header);
        }
        bytes.extend_from_slice(b"\r\n");

        let host = host_header
            .iter()
            .position(|&b| b == b':')
            .map(|colon| String::from_utf8_lossy(&host_header[colon + 1..]).trim().to_string())
            .unwrap_or_default();

        UpstreamRequest { bytes, host }
    }
}

// == Upstream Request ==
/// Rewritten request plus the Host value it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Full request, ready to write to the origin
    pub bytes: Vec<u8>,
    /// Value of the Host header sent upstream, used to pick the origin
    pub host: String,
}

impl UpstreamRequest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Origin `(host, port)` to connect to.
    ///
    /// The target's own hostname wins. Origin-relative targets fall back to
    /// the Host header, which may carry its own port.
    pub fn origin(&self, url: &ParsedUrl, target: &str) -> Result<(String, String)> {
        if !url.hostname.is_empty() {
            return Ok((url.hostname.clone(), url.port.clone()));
        }
        if self.host.is_empty() {
            return Err(ProxyError::MissingHost(target.to_string()));
        }

        let (host, port) = match self.host.rsplit_once(':') {
            Some((host, port))
                if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
            {
                (host, port)
            }
            _ => (self.host.as_str(), DEFAULT_PORT),
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');

        Ok((host.to_string(), port.to_string()))
    }
}

// == Read And Format ==
/// Consumes the client's header lines from `reader` and produces the
/// upstream request. Stops at the blank line or at EOF.
pub async fn format_request<R>(reader: &mut R, url: &ParsedUrl) -> Result<UpstreamRequest>
where
    R: AsyncBufRead + Unpin,
{
    let mut formatter = RequestFormatter::new();
    let mut buf = Vec::new();

    while read_line(reader, &mut buf, MAX_LINE).await? > 0 {
        if formatter.push_line(&buf) {
            break;
        }
    }

    Ok(formatter.finish(url))
}

/// Reads and discards the client's header lines through the blank line.
///
/// Used when the request is answered without being forwarded, so the
/// client's unread headers do not turn the close into a reset.
pub async fn skip_headers<R>(reader: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    while read_line(reader, &mut buf, MAX_LINE).await? > 0 {
        if is_blank_line(&buf) {
            break;
        }
    }
    Ok(())
}
