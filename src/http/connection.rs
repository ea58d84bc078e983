use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::body::BodyReader;
use crate::http::parser::{parse_request_head, ParseError};
use crate::http::request::{Method, RequestHead};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::router::{RequestContext, RouteTable};
use crate::server::ServerOptions;

pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    routes: Arc<RouteTable>,
    options: ServerOptions,
    state: ConnectionState,
}

pub enum ConnectionState {
    ReadingHead,
    ReadingBody {
        context: RequestContext,
        reader: BodyReader,
        keep_alive: bool,
    },
    Dispatching {
        context: RequestContext,
        keep_alive: bool,
    },
    Writing {
        writer: ResponseWriter,
        keep_alive: bool,
    },
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, routes: Arc<RouteTable>, options: ServerOptions) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            routes,
            options,
            state: ConnectionState::ReadingHead,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::ReadingHead => match self.read_head().await? {
                    Some(head) => {
                        let keep_alive = head.keep_alive();
                        let reader = BodyReader::for_head(&head);
                        if head.expects_continue() && !reader.is_done() {
                            self.send_continue().await?;
                        }
                        let context = match RequestContext::new(head) {
                            Ok(context) => context,
                            Err(e) => return self.reject(e).await,
                        };
                        self.state = ConnectionState::ReadingBody {
                            context,
                            reader,
                            keep_alive,
                        };
                    }
                    None => {
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::ReadingBody {
                    mut context,
                    mut reader,
                    keep_alive,
                } => {
                    let read = Self::read_body(
                        &mut self.stream,
                        &mut self.buffer,
                        &mut context,
                        &mut reader,
                    );
                    let completed = match self.options.body_timeout {
                        Some(limit) => timeout(limit, read).await.ok(),
                        None => Some(read.await),
                    };

                    match completed {
                        Some(result) => {
                            result?;
                            self.state = ConnectionState::Dispatching {
                                context,
                                keep_alive,
                            };
                        }
                        None => {
                            tracing::warn!(
                                path = %context.path(),
                                "request body not completed in time"
                            );
                            let response = Response::empty(StatusCode::REQUEST_TIMEOUT);
                            self.state = ConnectionState::Writing {
                                writer: ResponseWriter::new(&response, false, false),
                                keep_alive: false,
                            };
                        }
                    }
                }

                ConnectionState::Dispatching {
                    context,
                    keep_alive,
                } => {
                    let method = context.method().clone();
                    let path = context.path().to_string();

                    let response = context.finish(&self.routes).response().await;

                    tracing::info!(
                        %method,
                        path = %path,
                        status = response.status.as_u16(),
                        "request handled"
                    );

                    // HEAD responses announce the length but carry no body
                    let writer =
                        ResponseWriter::new(&response, keep_alive, method == Method::HEAD);
                    self.state = ConnectionState::Writing { writer, keep_alive };
                }

                ConnectionState::Writing {
                    mut writer,
                    keep_alive,
                } => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        self.state = ConnectionState::ReadingHead; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    // the peer may already be gone
                    let _ = self.stream.shutdown().await;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until a full request head is buffered.
    ///
    /// Returns `None` when the client closes the connection between requests.
    pub async fn read_head(&mut self) -> anyhow::Result<Option<RequestHead>> {
        loop {
            // Try parsing whatever we already have
            match parse_request_head(&self.buffer) {
                Ok((head, consumed)) => {
                    // Remove consumed bytes; body bytes stay buffered
                    self.buffer.advance(consumed);
                    return Ok(Some(head));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    // Malformed request → protocol error
                    return self.reject(e).await.map(|_| None);
                }
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    // Client closed connection
                    return Ok(None);
                }
                anyhow::bail!("connection closed in the middle of a request head");
            }
        }
    }

    /// Streams body bytes into the context until the body is complete.
    async fn read_body(
        stream: &mut S,
        buffer: &mut BytesMut,
        context: &mut RequestContext,
        reader: &mut BodyReader,
    ) -> anyhow::Result<()> {
        loop {
            while let Some(chunk) = reader.decode(buffer)? {
                context.buffer(&chunk);
            }
            if reader.is_done() {
                return Ok(());
            }

            let n = stream.read_buf(buffer).await?;
            if n == 0 {
                anyhow::bail!("connection closed before the request body completed");
            }
        }
    }

    /// Tells a client sending `Expect: 100-continue` to go ahead with the body.
    async fn send_continue(&mut self) -> anyhow::Result<()> {
        self.stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Answers a malformed request with `400` and fails the connection.
    async fn reject(&mut self, error: ParseError) -> anyhow::Result<()> {
        let mut writer =
            ResponseWriter::new(&Response::empty(StatusCode::BAD_REQUEST), false, false);
        if let Err(e) = writer.write_to_stream(&mut self.stream).await {
            tracing::debug!(error = %e, "could not deliver 400 response");
        }
        let _ = self.stream.shutdown().await;
        Err(anyhow::anyhow!("HTTP parse error: {}", error))
    }
}
