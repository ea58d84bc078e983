//! Route dispatch
//!
//! This module resolves a request path to a handler from a static table and
//! shapes the handler's answer into a response.

pub mod context;
pub mod responder;
pub mod table;

pub use context::{PendingResponse, Query, QueryValue, RequestContext, RequestData};
pub use responder::{Payload, Responder};
pub use table::{normalize_path, Handler, ResponseKind, RouteDescriptor, RouteTable};
