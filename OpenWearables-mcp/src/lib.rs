// Open Wearables MCP server
//
// Exposes the read-only query tools of the domain layer to MCP clients over
// stdio or HTTP + Server-Sent Events.

pub mod config;
pub mod error;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::{ToolError, TransportError};
pub use server::{McpServer, ServerContext};
