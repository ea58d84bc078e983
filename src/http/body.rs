//! Request body framing.
//!
//! A [`BodyReader`] pulls body bytes out of the connection buffer as they
//! arrive and reports the true end of the body, either after
//! `Content-Length` bytes or after the last chunk of a chunked body.

use bytes::{Buf, Bytes, BytesMut};

use crate::http::parser::ParseError;
use crate::http::request::RequestHead;

/// Longest chunk-size or trailer line accepted.
const MAX_CHUNK_LINE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyReader {
    /// A body of known length
    Length { remaining: usize },
    /// A `Transfer-Encoding: chunked` body
    Chunked(ChunkState),
    /// The body is complete
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Size,
    Data { remaining: usize },
    DataEnd,
    Trailers,
}

impl BodyReader {
    /// Picks the framing declared by the request head.
    ///
    /// Chunked coding wins over `Content-Length`. A request with neither has
    /// an empty body.
    pub fn for_head(head: &RequestHead) -> Self {
        if head.is_chunked() {
            return BodyReader::Chunked(ChunkState::Size);
        }
        match head.content_length() {
            0 => BodyReader::Done,
            remaining => BodyReader::Length { remaining },
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, BodyReader::Done)
    }

    /// Takes the next piece of body data out of `buf`.
    ///
    /// Returns `Ok(None)` when more input is needed or the body is complete;
    /// check [`BodyReader::is_done`] to tell the two apart. Framing bytes are
    /// consumed, bytes past the end of the body are left in `buf`.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, ParseError> {
        loop {
            match self {
                BodyReader::Done => return Ok(None),
                BodyReader::Length { remaining } => {
                    if buf.is_empty() {
                        return Ok(None);
                    }
                    let n = (*remaining).min(buf.len());
                    let chunk = buf.split_to(n).freeze();
                    *remaining -= n;
                    if *remaining == 0 {
                        *self = BodyReader::Done;
                    }
                    return Ok(Some(chunk));
                }
                BodyReader::Chunked(state) => match *state {
                    ChunkState::Size => {
                        let Some(line) = take_line(buf)? else {
                            return Ok(None);
                        };
                        let size = parse_chunk_size(&line)?;
                        *state = if size == 0 {
                            ChunkState::Trailers
                        } else {
                            ChunkState::Data { remaining: size }
                        };
                    }
                    ChunkState::Data { remaining } => {
                        if buf.is_empty() {
                            return Ok(None);
                        }
                        let n = remaining.min(buf.len());
                        let chunk = buf.split_to(n).freeze();
                        *state = if remaining == n {
                            ChunkState::DataEnd
                        } else {
                            ChunkState::Data {
                                remaining: remaining - n,
                            }
                        };
                        return Ok(Some(chunk));
                    }
                    ChunkState::DataEnd => {
                        if buf.len() < 2 {
                            return Ok(None);
                        }
                        if &buf[..2] != b"\r\n" {
                            return Err(ParseError::InvalidChunk);
                        }
                        buf.advance(2);
                        *state = ChunkState::Size;
                    }
                    ChunkState::Trailers => {
                        let Some(line) = take_line(buf)? else {
                            return Ok(None);
                        };
                        // trailer fields are discarded
                        if line.is_empty() {
                            *self = BodyReader::Done;
                        }
                    }
                },
            }
        }
    }
}

/// Splits off one CRLF-terminated line, without the terminator.
fn take_line(buf: &mut BytesMut) -> Result<Option<BytesMut>, ParseError> {
    match buf.windows(2).position(|w| w == b"\r\n") {
        Some(end) => {
            let mut line = buf.split_to(end + 2);
            line.truncate(end);
            Ok(Some(line))
        }
        None if buf.len() > MAX_CHUNK_LINE => Err(ParseError::InvalidChunk),
        None => Ok(None),
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidChunk)?;
    // chunk extensions follow a ';'
    let size = line.split(';').next().unwrap_or_default().trim();
    usize::from_str_radix(size, 16).map_err(|_| ParseError::InvalidChunk)
}
