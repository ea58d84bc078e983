use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::server::RequestServer;

/// Accept loop: one task per connection, no shared per-request state.
pub async fn run(server: RequestServer, listener: TcpListener) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        debug!("Accepted connection from {}", peer);

        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.handle(socket).await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
