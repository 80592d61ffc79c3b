use thiserror::Error;

use open_wearables_domain::services::ServiceError;

use crate::protocol::JsonRpcError;

/// Errors raised while executing a tool or reading a resource
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments missing, of the wrong type, or unparsable
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool with that name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No resource with that URI exists
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The query itself failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Result could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether the error belongs in a JSON-RPC error instead of a tool result
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_) | ToolError::UnknownResource(_) | ToolError::Serialization(_)
        )
    }

    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            ToolError::UnknownTool(_) | ToolError::UnknownResource(_) | ToolError::InvalidArguments(_) => {
                JsonRpcError::invalid_params(self.to_string())
            }
            _ => JsonRpcError::internal_error(self.to_string()),
        }
    }
}

/// Errors from the transport layer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
