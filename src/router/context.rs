//! Per-request state between the request head and dispatch.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::sync::oneshot;

use crate::http::decoder::Utf8Decoder;
use crate::http::parser::ParseError;
use crate::http::request::{Method, RequestHead};
use crate::http::response::{Response, StatusCode};
use crate::router::responder::Responder;
use crate::router::table::{normalize_path, RouteTable};

/// A query parameter value; repeated names collect into `Multi`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

/// Decoded query parameters, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Query::default();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            parsed.push(name.into_owned(), value.into_owned());
        }
        parsed
    }

    fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, QueryValue::Multi(values))) => values.push(value),
            Some((_, slot @ QueryValue::Single(_))) => {
                if let QueryValue::Single(first) = std::mem::replace(slot, QueryValue::Multi(Vec::new())) {
                    *slot = QueryValue::Multi(vec![first, value]);
                }
            }
            None => self.entries.push((name, QueryValue::Single(value))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The request as seen by a handler.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RequestData {
    /// Path with leading and trailing slashes removed
    pub path: String,
    pub method: Method,
    pub query: Query,
    /// Headers keyed by lower-cased name
    pub headers: HashMap<String, String>,
    /// Decoded request body
    pub payload: String,
}

/// Accumulates one request's body and dispatches it when complete.
///
/// Path, query and headers are fixed when the context is built from the
/// request head; only the body grows afterwards.
#[derive(Debug)]
pub struct RequestContext {
    path: String,
    method: Method,
    query: Query,
    headers: HashMap<String, String>,
    decoder: Utf8Decoder,
    body: String,
}

impl RequestContext {
    /// Extracts path, query and headers from a parsed head.
    pub fn new(head: RequestHead) -> Result<Self, ParseError> {
        let (path, query) = split_target(&head.target)?;
        Ok(Self {
            path: normalize_path(&path).to_string(),
            method: head.method,
            query: Query::parse(&query),
            headers: head.headers,
            decoder: Utf8Decoder::new(),
            body: String::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Body text decoded so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Feeds one chunk of body bytes, in arrival order.
    pub fn buffer(&mut self, chunk: &[u8]) {
        let text = self.decoder.write(chunk);
        self.body.push_str(&text);
    }

    /// Flushes the decoder, resolves the route and runs its handler.
    pub fn finish(mut self, routes: &RouteTable) -> PendingResponse {
        let tail = self.decoder.end();
        self.body.push_str(&tail);

        let descriptor = routes.resolve(&self.path);
        let (responder, rx) = Responder::channel(descriptor.kind());
        let path = self.path.clone();

        let data = RequestData {
            path: self.path,
            method: self.method,
            query: self.query,
            headers: self.headers,
            payload: self.body,
        };
        descriptor.dispatch(data, responder);

        PendingResponse { rx, path }
    }
}

/// A response a handler has committed, or will commit later.
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<Response>,
    path: String,
}

impl PendingResponse {
    /// Waits for the handler's response.
    ///
    /// A handler that drops its responder without answering gets a `500`.
    pub async fn response(self) -> Response {
        match self.rx.await {
            Ok(response) => response,
            Err(_) => {
                tracing::error!(
                    path = %self.path,
                    "handler dropped its responder without sending a response"
                );
                Response::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Splits a request target into raw path and query string.
fn split_target(target: &str) -> Result<(String, String), ParseError> {
    if target.starts_with('/') {
        let without_fragment = target.split('#').next().unwrap_or_default();
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        return Ok((path.to_string(), query.to_string()));
    }

    if target == "*" {
        return Ok((target.to_string(), String::new()));
    }

    // absolute-form, e.g. from a proxy
    let url = url::Url::parse(target).map_err(|_| ParseError::InvalidTarget)?;
    if url.cannot_be_a_base() {
        return Err(ParseError::InvalidTarget);
    }
    Ok((
        url.path().to_string(),
        url.query().unwrap_or_default().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_form_target() {
        let (path, query) = split_target("//ping/?a=1#frag").unwrap();
        assert_eq!(path, "//ping/");
        assert_eq!(query, "a=1");
    }

    #[test]
    fn absolute_form_target() {
        let (path, query) = split_target("http://example.com/hello?x=y").unwrap();
        assert_eq!(path, "/hello");
        assert_eq!(query, "x=y");
    }

    #[test]
    fn garbage_target_is_rejected() {
        assert_eq!(split_target("not a url").unwrap_err(), ParseError::InvalidTarget);
        assert_eq!(split_target("mailto:x@y").unwrap_err(), ParseError::InvalidTarget);
    }

    #[test]
    fn repeated_query_names_collect() {
        let query = Query::parse("a=1&b=2&a=3&a=4");

        assert_eq!(
            query.get("a"),
            Some(&QueryValue::Multi(vec!["1".into(), "3".into(), "4".into()]))
        );
        assert_eq!(query.get("b"), Some(&QueryValue::Single("2".into())));
        assert_eq!(query.len(), 2);
    }
}
