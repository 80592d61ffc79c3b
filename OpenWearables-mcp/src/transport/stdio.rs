use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::debug;

use super::Transport;
use crate::error::TransportError;
use crate::protocol::JsonRpcResponse;

/// Newline-delimited JSON-RPC over a reader/writer pair.
///
/// Generic so tests can drive it with in-memory buffers; the server binary
/// uses [`StdioTransport::stdio`].
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Transport over the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<String>, TransportError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                debug!("Received frame: {}", trimmed);
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<(), TransportError> {
        let mut frame = serde_json::to_vec(response).map_err(std::io::Error::from)?;
        frame.push(b'\n');

        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
