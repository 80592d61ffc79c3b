//! HTTP + Server-Sent Events transport.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to POST its JSON-RPC messages to. Responses are pushed back on the event
//! stream as `message` events. Each stream is one session with its own
//! protocol state; the session ends when the stream is dropped.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Extension, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::health;
use crate::error::TransportError;
use crate::protocol::JsonRpcResponse;
use crate::server::{McpServer, ServerContext};

/// Responses queued per session before the POST handler waits for the stream
const SESSION_BUFFER: usize = 64;

struct Session {
    server: Arc<McpServer>,
    sender: mpsc::Sender<JsonRpcResponse>,
}

/// Shared state of the SSE server
#[derive(Clone)]
pub struct SseState {
    ctx: Arc<ServerContext>,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SseState {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self {
            ctx,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    /// Drop every session, which ends their event streams
    pub fn close_all(&self) {
        if let Ok(mut sessions) = self.sessions.lock() {
            info!("Closing {} SSE session(s)", sessions.len());
            sessions.clear();
        }
    }

    fn open(&self) -> Option<(Uuid, mpsc::Receiver<JsonRpcResponse>)> {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(SESSION_BUFFER);
        let session = Session {
            server: Arc::new(McpServer::new(self.ctx.clone())),
            sender,
        };
        self.sessions.lock().ok()?.insert(id, session);
        Some((id, receiver))
    }

    fn lookup(&self, id: &Uuid) -> Option<(Arc<McpServer>, mpsc::Sender<JsonRpcResponse>)> {
        let sessions = self.sessions.lock().ok()?;
        sessions
            .get(id)
            .map(|session| (session.server.clone(), session.sender.clone()))
    }

    fn remove(&self, id: &Uuid) {
        if let Ok(mut sessions) = self.sessions.lock() {
            if sessions.remove(id).is_some() {
                info!("SSE session {} closed", id);
            }
        }
    }
}

/// Removes the session when the event stream is dropped
struct SessionGuard {
    state: SseState,
    id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.remove(&self.id);
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: Uuid,
}

/// Build the SSE router. The returned state lets the caller close sessions.
pub fn create_sse_router(ctx: Arc<ServerContext>) -> (Router, SseState) {
    debug!("Creating SSE router");
    let state = SseState::new(ctx.clone());

    let router = Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(message_handler))
        .with_state(state.clone())
        .route("/health", get(health::health_check))
        .layer(Extension(ctx.health.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    health::initialize_server_start_time();
    (router, state)
}

async fn sse_handler(State(state): State<SseState>) -> Response {
    let Some((id, receiver)) = state.open() else {
        error!("Session table is unavailable");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    info!("SSE session {} opened", id);

    Sse::new(session_stream(state, id, receiver))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn session_stream(
    state: SseState,
    id: Uuid,
    receiver: mpsc::Receiver<JsonRpcResponse>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?session_id={}", id));
    let guard = SessionGuard { state, id };

    let messages = stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        let response = receiver.recv().await?;
        let event = match serde_json::to_string(&response) {
            Ok(data) => Event::default().event("message").data(data),
            Err(e) => {
                error!("Failed to encode response: {}", e);
                Event::default().comment("encoding error")
            }
        };
        Some((Ok(event), (receiver, guard)))
    });

    stream::once(async move { Ok(endpoint) }).chain(messages)
}

async fn message_handler(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some((server, sender)) = state.lookup(&query.session_id) else {
        warn!("Message for unknown session {}", query.session_id);
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    let message: Value = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!("Malformed message for session {}: {}", query.session_id, e);
            return (StatusCode::BAD_REQUEST, "Could not parse message").into_response();
        }
    };

    if let Some(response) = server.handle_value(message).await {
        if sender.send(response).await.is_err() {
            state.remove(&query.session_id);
            return (StatusCode::NOT_FOUND, "Session closed").into_response();
        }
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Bind `host:port` and serve until a shutdown signal arrives
pub async fn run_sse(ctx: Arc<ServerContext>, host: &str, port: u16) -> Result<(), TransportError> {
    let (router, state) = create_sse_router(ctx);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|source| TransportError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("SSE transport listening on http://{}/sse", addr);

    // Event streams only end once their sessions are dropped
    let shutdown_state = state.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            super::shutdown_signal().await;
            shutdown_state.close_all();
        })
        .await?;

    info!("SSE transport stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_query_requires_uuid() {
        let query: Result<MessageQuery, _> = serde_json::from_value(serde_json::json!({"session_id": "abc"}));
        assert!(query.is_err());
    }
}
