//! Splitting `scheme://host/path` URLs into their parts.
//!
//! Only the pieces a backend needs are extracted: the scheme selects the
//! backend and the percent-decoded path becomes its key. Query strings and
//! fragments are dropped.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::{FsError, FsResult};

/// Characters escaped when a path is written back out as part of a URL.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A parsed filesystem URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Lowercased scheme identifier (e.g. `internal`).
    pub scheme: String,
    /// Authority component, often empty (`internal:///a` has no host).
    pub host: String,
    /// Decoded path component including its leading `/`, or empty.
    pub path: String,
}

impl Location {
    /// Parse a URL of the form `scheme://host/path` or `scheme:/path`.
    ///
    /// Percent escapes in the path are decoded, so `internal:///a%20b` and
    /// `internal:///a b` address the same key. Opaque forms such as
    /// `scheme:a/b` are rejected.
    pub fn parse(url: &str) -> FsResult<Self> {
        let invalid = || FsError::InvalidUrl(url.to_string());

        let (scheme, rest) = url.split_once(':').ok_or_else(invalid)?;
        if !is_valid_scheme(scheme) {
            return Err(invalid());
        }

        // Query and fragment never take part in the key.
        let rest = rest.split(['?', '#']).next().unwrap_or("");

        let (host, raw_path) = if let Some(authority) = rest.strip_prefix("//") {
            match authority.find('/') {
                Some(idx) => (&authority[..idx], &authority[idx..]),
                None => (authority, ""),
            }
        } else if rest.starts_with('/') {
            ("", rest)
        } else {
            return Err(invalid());
        };

        let path = decode_path(raw_path).ok_or_else(invalid)?;

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
            path,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}{}",
            self.scheme,
            self.host,
            utf8_percent_encode(&self.path, PATH_ESCAPES)
        )
    }
}

/// Decode `%XX` escapes. Malformed escapes and non-UTF-8 results are errors.
fn decode_path(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    for (idx, _) in raw.match_indices('%') {
        let hex = bytes.get(idx + 1..idx + 3)?;
        if !hex.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
    }
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// True if `scheme` can appear in a URL: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
/// per RFC 3986.
pub fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
