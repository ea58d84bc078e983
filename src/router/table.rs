//! Static route table
//!
//! Routes are registered once at startup and never mutated afterwards, so a
//! table can be shared across connections behind an `Arc` without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::router::context::RequestData;
use crate::router::responder::{Payload, Responder};

/// How a handler's payload is written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Serialized as JSON with `content-type: application/json`
    Json,
    /// Written verbatim with no content-type
    #[default]
    Raw,
}

/// An application-supplied request handler.
///
/// A handler must answer through its [`Responder`] exactly once. It may move
/// the responder into another task and answer later.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, data: RequestData, responder: Responder);
}

impl<F> Handler for F
where
    F: Fn(RequestData, Responder) + Send + Sync + 'static,
{
    fn handle(&self, data: RequestData, responder: Responder) {
        self(data, responder)
    }
}

/// A handler paired with its response kind.
#[derive(Clone)]
pub struct RouteDescriptor {
    handler: Arc<dyn Handler>,
    kind: ResponseKind,
}

impl RouteDescriptor {
    pub fn new(kind: ResponseKind, handler: impl Handler) -> Self {
        Self {
            handler: Arc::new(handler),
            kind,
        }
    }

    pub fn raw(handler: impl Handler) -> Self {
        Self::new(ResponseKind::Raw, handler)
    }

    pub fn json(handler: impl Handler) -> Self {
        Self::new(ResponseKind::Json, handler)
    }

    /// The descriptor used when no route matches: 404 with an empty body.
    pub fn not_found() -> Self {
        Self::raw(|_data: RequestData, responder: Responder| {
            responder.send(404, Payload::Empty)
        })
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Runs the handler with a responder of this descriptor's kind.
    pub fn dispatch(&self, data: RequestData, responder: Responder) {
        self.handler.handle(data, responder)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Strips every leading and trailing `/`.
///
/// # Example
///
/// ```
/// # use switchyard::router::normalize_path;
/// assert_eq!(normalize_path("//ping/"), "ping");
/// assert_eq!(normalize_path("/a/b/"), "a/b");
/// ```
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Read-only mapping from normalized path to route descriptor.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, RouteDescriptor>,
    fallback: RouteDescriptor,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Looks up a route by exact match after normalization, falling back to
    /// the not-found descriptor.
    pub fn resolve(&self, path: &str) -> &RouteDescriptor {
        self.routes
            .get(normalize_path(path))
            .unwrap_or(&self.fallback)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered route keys, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

/// Collects routes before the table is frozen.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<String, RouteDescriptor>,
}

impl RouteTableBuilder {
    /// Registers a descriptor. A later registration for the same normalized
    /// path replaces the earlier one.
    pub fn descriptor(mut self, path: &str, descriptor: RouteDescriptor) -> Self {
        let key = normalize_path(path).to_string();
        if self.routes.insert(key, descriptor).is_some() {
            tracing::warn!(path, "route registered twice, keeping the last one");
        }
        self
    }

    /// Registers a raw-kind handler.
    pub fn route(self, path: &str, handler: impl Handler) -> Self {
        self.descriptor(path, RouteDescriptor::raw(handler))
    }

    /// Registers a JSON-kind handler.
    pub fn json(self, path: &str, handler: impl Handler) -> Self {
        self.descriptor(path, RouteDescriptor::json(handler))
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
            fallback: RouteDescriptor::not_found(),
        }
    }
}
