//! MCP transports.
//!
//! Stream transports (stdio) implement [`Transport`] and are driven by
//! [`serve`]. The SSE transport is an HTTP server and runs its own loop.

pub mod health;
pub mod sse;
pub mod stdio;

use std::future::Future;

use async_trait::async_trait;
use tokio::signal;
use tracing::{error, info};

use crate::error::TransportError;
use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;

pub use sse::{create_sse_router, run_sse, SseState};
pub use stdio::StdioTransport;

/// A bidirectional stream of JSON-RPC frames
#[async_trait]
pub trait Transport: Send {
    /// Next raw frame, or `None` once the peer has closed the stream
    async fn receive(&mut self) -> Result<Option<String>, TransportError>;

    /// Write one response frame
    async fn send(&mut self, response: &JsonRpcResponse) -> Result<(), TransportError>;
}

/// Answer frames from `transport` until it closes or `shutdown` completes
pub async fn serve<T, F>(server: &McpServer, transport: &mut T, shutdown: F) -> Result<(), TransportError>
where
    T: Transport,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let frame = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, closing transport");
                break;
            }
            frame = transport.receive() => frame?,
        };

        let Some(frame) = frame else {
            info!("Client closed the connection");
            break;
        };

        if let Some(response) = server.handle_message(&frame).await {
            transport.send(&response).await?;
        }
    }

    Ok(())
}

/// Resolves on CTRL+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
