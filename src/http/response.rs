/// An HTTP status code.
///
/// Handlers may answer with any three-digit status, so this wraps the raw
/// code rather than enumerating a fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 408 Request Timeout
    pub const REQUEST_TIMEOUT: StatusCode = StatusCode(408);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn new(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use switchyard::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::new(406).as_u16(), 406);
    /// ```
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Whether the code fits a status line: three digits, 100 to 999.
    pub const fn is_valid(&self) -> bool {
        self.0 >= 100 && self.0 <= 999
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// Codes without a registered phrase get `"Unknown"`.
    ///
    /// # Example
    ///
    /// ```
    /// # use switchyard::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            408 => "Request Timeout",
            409 => "Conflict",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers keep the order in which they were set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as name/value pairs
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates an empty-bodied response, used for transport-level errors.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Vec::new())
    }

    /// Looks up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("cannot set header `{0}` after the status line was written")]
    HeadersSent(String),
    #[error("status line already written")]
    HeadAlreadyWritten,
    #[error("invalid status code {0}")]
    InvalidStatus(u16),
}

/// Strict, ordered response assembly.
///
/// Mirrors a transport that sends the status line and headers as soon as
/// [`ResponseSink::write_head`] is called: headers must be set before it,
/// and the head can be written only once.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces a header.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ResponseError> {
        let name = name.into();
        if self.status.is_some() {
            return Err(ResponseError::HeadersSent(name));
        }
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        Ok(())
    }

    /// Commits the status line together with the headers set so far.
    pub fn write_head(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        if self.status.is_some() {
            return Err(ResponseError::HeadAlreadyWritten);
        }
        if !status.is_valid() {
            return Err(ResponseError::InvalidStatus(status.as_u16()));
        }
        self.status = Some(status);
        Ok(())
    }

    pub fn headers_sent(&self) -> bool {
        self.status.is_some()
    }

    /// Closes the response with `body`. An unwritten head commits as 200.
    pub fn end(self, body: impl Into<Vec<u8>>) -> Response {
        Response {
            status: self.status.unwrap_or(StatusCode::OK),
            headers: self.headers,
            body: body.into(),
        }
    }
}
