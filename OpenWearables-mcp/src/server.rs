//! MCP request dispatch.
//!
//! `McpServer` is transport-agnostic: it takes one decoded JSON-RPC frame and
//! returns the response to send back, or nothing for notifications. Each
//! client connection gets its own `McpServer` so initialization state is
//! tracked per connection, while the services behind it are shared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use open_wearables_domain::database::DatabasePool;
use open_wearables_domain::health::{HealthService, HealthServiceTrait};
use open_wearables_domain::services::{
    create_default_event_record_service, create_default_timeseries_service, create_default_user_service,
    EventRecordServiceTrait, TimeSeriesServiceTrait, UserServiceTrait,
};

use crate::protocol::*;
use crate::resources;
use crate::tools;

pub const SERVER_NAME: &str = "Open Wearables MCP";

pub const SERVER_INSTRUCTIONS: &str = "\
Open Wearables MCP Server provides access to health and wearable data.

Available data types:
- Workouts: Running, cycling, swimming, strength training, etc.
- Sleep sessions: Duration, efficiency, sleep stages (deep, light, REM, awake)
- Time-series data: Heart rate, steps, HRV, blood pressure, weight, and more

To query data, you need a user_id. Use list_users to find available users,
then use get_user to get details about a specific user.
All date/time parameters should be in ISO 8601 format.";

/// Services shared by every connection
pub struct ServerContext {
    pub users: Arc<dyn UserServiceTrait>,
    pub events: Arc<dyn EventRecordServiceTrait>,
    pub timeseries: Arc<dyn TimeSeriesServiceTrait>,
    pub health: Arc<dyn HealthServiceTrait>,
}

impl ServerContext {
    pub fn new(
        users: Arc<dyn UserServiceTrait>,
        events: Arc<dyn EventRecordServiceTrait>,
        timeseries: Arc<dyn TimeSeriesServiceTrait>,
        health: Arc<dyn HealthServiceTrait>,
    ) -> Self {
        Self {
            users,
            events,
            timeseries,
            health,
        }
    }

    /// Wire the SQLite-backed services over one pool
    pub fn from_pool(pool: DatabasePool) -> Self {
        Self::new(
            Arc::new(create_default_user_service(pool.clone())),
            Arc::new(create_default_event_record_service(pool.clone())),
            Arc::new(create_default_timeseries_service(pool.clone())),
            Arc::new(HealthService::new(pool)),
        )
    }
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

/// Protocol state for one client connection
#[derive(Debug)]
pub struct McpServer {
    ctx: Arc<ServerContext>,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self {
            ctx,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.ctx
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle one raw JSON-RPC frame
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                warn!("Failed to parse JSON-RPC message: {}", e);
                Some(JsonRpcResponse::error(RequestId::Null, JsonRpcError::parse_error(e.to_string())))
            }
        }
    }

    /// Handle one decoded JSON-RPC frame. Returns `None` for notifications.
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let raw_id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok())
            .unwrap_or(RequestId::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    raw_id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(RequestId::Null),
                JsonRpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            ));
        }

        match request.id.clone() {
            Some(id) => Some(self.handle_request(id, request).await),
            None => {
                self.handle_notification(&request);
                None
            }
        }
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => debug!("Client finished initialization"),
            "notifications/cancelled" => debug!("Client cancelled request: {:?}", request.params),
            other => debug!("Ignoring notification: {}", other),
        }
    }

    async fn handle_request(&self, id: RequestId, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request {:?}: {}", id, request.method);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" | "tools/call" | "resources/list" | "resources/read" if !self.is_initialized() => {
                JsonRpcResponse::error(id, JsonRpcError::invalid_request("Server not initialized"))
            }
            "tools/list" => to_response(id, ToolsListResult { tools: tools::all_tools() }),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => to_response(
                id,
                ResourcesListResult {
                    resources: resources::all_resources(),
                },
            ),
            "resources/read" => self.handle_resources_read(id, request.params),
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                );
            }
            None => return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing initialize params")),
        };

        info!(
            "Initializing session: client={}, protocol={}",
            params
                .client_info
                .as_ref()
                .map(|client| client.name.as_str())
                .unwrap_or("unknown"),
            params.protocol_version
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        };

        self.initialized.store(true, Ordering::SeqCst);
        to_response(id, result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
            }
            None => return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params")),
        };

        info!("Calling tool: {}", params.name);
        match tools::call_tool(&self.ctx, &params.name, params.arguments).await {
            Ok(value) => to_response(id, ToolCallResult::json(value)),
            Err(err) if err.is_protocol_error() => {
                warn!("Tool call {} rejected: {}", params.name, err);
                JsonRpcResponse::error(id, err.to_rpc_error())
            }
            Err(err) => {
                warn!("Tool {} failed: {}", params.name, err);
                to_response(id, ToolCallResult::error(err.to_string()))
            }
        }
    }

    fn handle_resources_read(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ResourceReadParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
            }
            None => return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params")),
        };

        match resources::read_resource(&params.uri) {
            Ok(result) => to_response(id, result),
            Err(err) => JsonRpcResponse::error(id, err.to_rpc_error()),
        }
    }
}

fn to_response<T: serde::Serialize>(id: RequestId, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}
