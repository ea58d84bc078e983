//! One-shot response callback handed to route handlers.

use serde_json::Value;
use tokio::sync::oneshot;

use crate::http::response::{Response, ResponseError, ResponseSink, StatusCode};
use crate::router::table::ResponseKind;

/// What a handler answers with.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No payload: `{}` for JSON routes, an empty body otherwise
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

impl Payload {
    /// Renders the payload as a JSON document.
    fn into_json(self) -> String {
        match self {
            Payload::Empty => "{}".to_string(),
            Payload::Text(text) => Value::String(text).to_string(),
            Payload::Json(value) => value.to_string(),
        }
    }

    /// Renders the payload as a literal body.
    fn into_text(self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Text(text) => text,
            Payload::Json(value) => value.to_string(),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Commits the response for one request.
///
/// `send` consumes the responder, so a handler cannot answer twice. A
/// responder dropped without answering is reported by the connection, which
/// then replies `500`.
#[derive(Debug)]
pub struct Responder {
    kind: ResponseKind,
    tx: oneshot::Sender<Response>,
}

impl Responder {
    /// Creates a responder and the receiving end of its response.
    ///
    /// Useful for exercising handlers without a connection.
    pub fn channel(kind: ResponseKind) -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Self { kind, tx }, rx)
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Shapes `payload` according to the route's kind and commits it.
    ///
    /// A status outside 100-999, or any other shaping failure, is logged and
    /// answered with an empty `500`.
    pub fn send(self, status: u16, payload: impl Into<Payload>) {
        let response = match shape(self.kind, StatusCode::new(status), payload.into()) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "failed to shape response");
                Response::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        if self.tx.send(response).is_err() {
            tracing::debug!(status, "connection closed before the response was committed");
        }
    }

    /// Answers `200` with no payload.
    pub fn ok(self) {
        self.send(200, Payload::Empty)
    }
}

/// Builds the response for a route kind.
///
/// JSON responses set `content-type` before the status line is committed.
pub fn shape(
    kind: ResponseKind,
    status: StatusCode,
    payload: Payload,
) -> Result<Response, ResponseError> {
    let mut sink = ResponseSink::new();
    match kind {
        ResponseKind::Json => {
            sink.set_header("content-type", "application/json")?;
            sink.write_head(status)?;
            Ok(sink.end(payload.into_json()))
        }
        ResponseKind::Raw => {
            sink.write_head(status)?;
            Ok(sink.end(payload.into_text()))
        }
    }
}
