//! Routes served by the `switchyard` binary.

use serde_json::json;

use crate::http::request::Method;
use crate::router::{RequestData, Responder, RouteTable};

/// Accepts only POST; echoes the query string back.
///
/// Answers `406` on success, which clients of this endpoint already expect.
pub fn hello(data: RequestData, responder: Responder) {
    if data.method == Method::POST {
        responder.send(
            406,
            json!({
                "response": "Hello from switchyard",
                "postdata": data.query,
            }),
        );
    } else {
        responder.send(
            500,
            json!({
                "error": format!("You must POST data to the hello route, not {}", data.method),
            }),
        );
    }
}

/// Liveness check.
pub fn ping(_data: RequestData, responder: Responder) {
    responder.ok()
}

pub fn http_routes() -> RouteTable {
    RouteTable::builder()
        .json("hello", hello)
        .route("ping", ping)
        .build()
}

pub fn https_routes() -> RouteTable {
    RouteTable::builder().route("ping", ping).build()
}
