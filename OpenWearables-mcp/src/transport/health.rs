use std::collections::BTreeMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use open_wearables_domain::health::{ComponentStatus, HealthServiceTrait, SystemStatus};

/// Health check response for the SSE server
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    pub version: String,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: BTreeMap<String, ComponentHealthStatus>,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the start time used for uptime reporting
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(now_secs());
    });
}

/// `GET /health`: 200 when healthy, 503 when degraded, 500 otherwise
#[instrument]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait>>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = now_secs();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));
    let system_health = health_service.get_system_health().await;

    let components = system_health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealthStatus {
                    status: map_component_status(&component.status).to_string(),
                    message: component.details,
                },
            )
        })
        .collect();

    let (code, status) = match system_health.status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (code, Json(response))
}

fn map_component_status(status: &ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "ok",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "error",
    }
}
