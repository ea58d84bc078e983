use crate::http::request::{Method, RequestHead};
use std::collections::HashMap;

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequest,
    #[error("unknown request method")]
    InvalidMethod,
    #[error("unsupported HTTP version")]
    InvalidVersion,
    #[error("malformed request target")]
    InvalidTarget,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("malformed chunked body")]
    InvalidChunk,
    #[error("request head exceeds {MAX_HEAD_SIZE} bytes")]
    HeadTooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses the request line and headers at the start of `buf`.
///
/// Returns the head and the number of bytes it occupied, including the blank
/// line. Body bytes that follow are left for the caller to frame.
pub fn parse_request_head(buf: &[u8]) -> Result<(RequestHead, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) => end,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    if headers_end > MAX_HEAD_SIZE {
        return Err(ParseError::HeadTooLarge);
    }

    let headers_str = std::str::from_utf8(&buf[..headers_end])
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() || target.is_empty() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;
    if version != "HTTP/1.1" && version != "HTTP/1.0" {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers: HashMap<String, String> = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        if key.is_empty() || key.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::InvalidHeader);
        }

        let key = key.to_ascii_lowercase();
        let value = value.trim();
        headers
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    if let Some(length) = headers.get("content-length") {
        length
            .trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
    }

    let head = RequestHead {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
    };

    Ok((head, headers_end + 4))
}

pub(crate) fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
