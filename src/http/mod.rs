//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.x side of the router: reading request
//! heads, framing request bodies, decoding body text and writing responses.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request lifecycle state machine
//! - **`parser`**: Parses request lines and headers from byte buffers
//! - **`body`**: Frames request bodies (`Content-Length` or chunked)
//! - **`decoder`**: Incremental UTF-8 decoding across chunk boundaries
//! - **`request`**: Request head representation
//! - **`response`**: Responses, status codes and the strict response sink
//! - **`writer`**: Serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │ ReadingHead │ ← Wait for request line + headers
//!        └──────┬──────┘
//!               │ Head parsed, RequestContext built
//!               ▼
//!        ┌─────────────┐
//!        │ ReadingBody │ ← Feed body chunks to the decoder
//!        └──────┬──────┘
//!               │ End of body
//!               ▼
//!        ┌─────────────┐
//!        │ Dispatching │ ← Resolve route, run handler, await response
//!        └──────┬──────┘
//!               │ Response committed
//!               ▼
//!        ┌─────────────┐
//!        │   Writing   │ ← Send response to client
//!        └──────┬──────┘
//!               ├─ Keep-Alive → ReadingHead (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use switchyard::http::connection::Connection;
//! use switchyard::router::RouteTable;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let routes = Arc::new(RouteTable::builder().build());
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let routes = routes.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, routes, Default::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod body;
pub mod connection;
pub mod decoder;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
