use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// The method is handed to route handlers unaltered; the router itself never
/// gates on it. Tokens outside the registered set are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// TRACE - Message loop-back test
    TRACE,
    /// Extension method such as PROPFIND or PURGE, stored verbatim
    Other(String),
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string is a valid method token, `None` if it is
    /// empty or contains characters outside the HTTP token set.
    ///
    /// # Example
    ///
    /// ```
    /// # use switchyard::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("PURGE"), Some(Method::Other("PURGE".into())));
    /// assert_eq!(Method::from_str("G(ET"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            "CONNECT" => Some(Method::CONNECT),
            "TRACE" => Some(Method::TRACE),
            other if is_token(other) => Some(Method::Other(other.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
            Method::Other(token) => token,
        }
    }
}

/// RFC 9110 `token`: one or more tchar.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Method {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The request line and headers of an incoming request.
///
/// Header names are stored lower-cased; repeated headers are joined with
/// `", "`. The body is not part of the head: it is framed separately by
/// [`crate::http::body::BodyReader`] so that it can be streamed.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, e.g. `/hello?name=x`
    pub target: String,
    /// HTTP version (`HTTP/1.1` or `HTTP/1.0`)
    pub version: String,
    /// Request headers keyed by lower-cased name
    pub headers: HashMap<String, String>,
}

impl RequestHead {
    /// Retrieves a header value by name, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the body uses chunked transfer coding.
    pub fn is_chunked(&self) -> bool {
        self.header("Transfer-Encoding")
            .and_then(|v| v.rsplit(',').next())
            .map(|last| last.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false)
    }

    /// Whether the client waits for `100 Continue` before sending the body.
    pub fn expects_continue(&self) -> bool {
        self.version == "HTTP/1.1"
            && self
                .header("Expect")
                .map(|v| v.trim().eq_ignore_ascii_case("100-continue"))
                .unwrap_or(false)
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close` is sent.
    /// HTTP/1.0 defaults to close unless `Connection: keep-alive` is sent.
    pub fn keep_alive(&self) -> bool {
        let connection = self.header("Connection");
        if self.version == "HTTP/1.0" {
            connection
                .map(|v| v.eq_ignore_ascii_case("keep-alive"))
                .unwrap_or(false)
        } else {
            connection
                .map(|v| !v.eq_ignore_ascii_case("close"))
                .unwrap_or(true)
        }
    }
}
