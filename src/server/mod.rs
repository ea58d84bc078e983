//! Listening servers
//!
//! A [`RequestServer`] owns a route table and a transport (plain TCP or TLS)
//! and runs one [`Connection`] task per accepted socket.

pub mod listener;
pub mod tls;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use crate::http::connection::Connection;
use crate::router::RouteTable;

pub use tls::{SecurityMaterial, TlsError};

/// Per-connection tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerOptions {
    /// Bound on how long a request body may take to arrive.
    ///
    /// `None` waits indefinitely for the end of the body.
    pub body_timeout: Option<Duration>,
}

#[derive(Clone)]
enum Transport {
    Plain,
    Tls(TlsAcceptor),
}

/// An HTTP or HTTPS server dispatching to a static route table.
#[derive(Clone)]
pub struct RequestServer {
    routes: Arc<RouteTable>,
    transport: Transport,
    options: ServerOptions,
}

impl RequestServer {
    /// Prepares a server; no socket is opened until [`RequestServer::listen`].
    ///
    /// Without security material the server speaks plain HTTP. With it, every
    /// connection is TLS-terminated using the given key and certificate.
    pub fn create(
        routes: RouteTable,
        security: Option<SecurityMaterial>,
    ) -> Result<Self, TlsError> {
        let transport = match security {
            None => Transport::Plain,
            Some(material) => Transport::Tls(material.acceptor()?),
        };

        Ok(Self {
            routes: Arc::new(routes),
            transport,
            options: ServerOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.transport, Transport::Tls(_))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn scheme(&self) -> &'static str {
        if self.is_encrypted() { "https" } else { "http" }
    }

    /// Binds `port` on all interfaces and accepts connections forever.
    pub async fn listen(&self, port: u16, label: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind {} port {}", self.scheme(), port))?;
        self.serve(listener, label).await
    }

    /// Accepts connections on an already bound listener.
    pub async fn serve(&self, listener: TcpListener, label: &str) -> anyhow::Result<()> {
        let port = listener.local_addr()?.port();
        tracing::info!(
            env = label,
            port,
            scheme = self.scheme(),
            "The server: environment {} is listening on port {}",
            label,
            port
        );
        listener::run(self.clone(), listener).await
    }

    /// Runs the request lifecycle over one accepted stream.
    ///
    /// TLS servers complete the handshake first; a failed handshake ends the
    /// connection.
    pub async fn handle<S>(&self, stream: S) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match &self.transport {
            Transport::Plain => {
                let mut conn = Connection::new(stream, self.routes.clone(), self.options);
                conn.run().await
            }
            Transport::Tls(acceptor) => {
                let stream = acceptor
                    .accept(stream)
                    .await
                    .context("TLS handshake failed")?;
                let mut conn = Connection::new(stream, self.routes.clone(), self.options);
                conn.run().await
            }
        }
    }
}
