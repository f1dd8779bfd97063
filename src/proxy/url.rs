//! Request-target parsing.

/// Port used when the target does not name one.
pub const DEFAULT_PORT: &str = "80";

// == Parsed Url ==
/// Origin coordinates extracted from a request target.
///
/// No decoding or validation is done; malformed targets yield whatever
/// pieces the split produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Origin host, empty for origin-relative targets
    pub hostname: String,
    /// Origin port as written in the target
    pub port: String,
    /// Path and query, starting at `/`; may be empty
    pub path: String,
}

impl ParsedUrl {
    // == Parse ==
    /// Splits `raw` into hostname, port and path.
    ///
    /// - No `//`: origin-relative. Path runs from the first `/`, host is empty.
    /// - `//host:port/path`: a `:` before the first `/` ends the host; the
    ///   digits after it are the port and the path starts at the first
    ///   non-digit.
    /// - `//host/path`: host up to the `/`, path from it.
    /// - `//host`: everything is host, path is empty.
    pub fn parse(raw: &str) -> Self {
        let Some(scheme_end) = raw.find("//") else {
            return Self {
                hostname: String::new(),
                port: DEFAULT_PORT.to_string(),
                path: raw.find('/').map(|i| raw[i..].to_string()).unwrap_or_default(),
            };
        };

        let rest = &raw[scheme_end + 2..];
        let slash = rest.find('/');
        let colon = rest.find(':').filter(|&c| slash.map_or(true, |s| c < s));

        if let Some(colon) = colon {
            let after = &rest[colon + 1..];
            let digits = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            let port = if digits == 0 { DEFAULT_PORT } else { &after[..digits] };

            return Self {
                hostname: rest[..colon].to_string(),
                port: port.to_string(),
                path: after[digits..].to_string(),
            };
        }

        match slash {
            Some(slash) => Self {
                hostname: rest[..slash].to_string(),
                port: DEFAULT_PORT.to_string(),
                path: rest[slash..].to_string(),
            },
            None => Self {
                hostname: rest.to_string(),
                port: DEFAULT_PORT.to_string(),
                path: String::new(),
            },
        }
    }

    /// Path to put on the upstream request line; `/` when the target had none.
    pub fn request_path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }
}
