use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response, adding `content-length` and `connection`.
///
/// With `omit_body` the head still announces the body's length but the body
/// bytes are not written, as required for responses to HEAD.
pub fn serialize_response(resp: &Response, keep_alive: bool, omit_body: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        if k.eq_ignore_ascii_case("content-length") || k.eq_ignore_ascii_case("connection") {
            continue;
        }
        write_header(&mut buf, k, v);
    }
    write_header(&mut buf, "content-length", &resp.body.len().to_string());
    write_header(
        &mut buf,
        "connection",
        if keep_alive { "keep-alive" } else { "close" },
    );

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    if !omit_body {
        buf.extend_from_slice(&resp.body);
    }

    buf
}

fn write_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, keep_alive: bool, omit_body: bool) -> Self {
        Self {
            buffer: serialize_response(response, keep_alive, omit_body),
            written: 0,
        }
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        // TLS streams buffer records until flushed
        stream.flush().await?;
        Ok(())
    }
}
