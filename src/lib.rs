//! Switchyard - minimal HTTP/HTTPS request router
//!
//! Core library: wire handling, route dispatch and the listening servers.

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
