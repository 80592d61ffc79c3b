//! Domain layer health check functionality
//! This module provides health check services for the server

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use open_wearables_data::database::{self, DatabasePool};

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if not
    /// Returns an error if the check could not be performed
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check if the database is available and functioning properly
///
/// Returns:
/// - Ok(true) if the database answers and passes an integrity quick check
/// - Ok(false) if the database answers but the quick check reports problems
/// - Err if no connection could be obtained
pub fn check_database_status(pool: &DatabasePool) -> Result<bool, String> {
    let conn = pool
        .get()
        .map_err(|e| format!("Database connection error: {}", e))?;

    let verdict: String = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .map_err(|e| format!("Database query error: {}", e))?;

    if verdict == "ok" {
        Ok(true)
    } else {
        warn!("Database quick check reported: {}", verdict);
        Ok(false)
    }
}

/// Get overall system health from a database check result
pub fn get_system_health(db_status: Result<bool, String>, connection_info: Option<String>) -> SystemHealth {
    let db_component = match db_status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: connection_info,
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database is available but failed its integrity check".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    };

    let overall_status = match db_component.status {
        ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        ComponentStatus::Degraded => SystemStatus::Degraded,
        ComponentStatus::Healthy => SystemStatus::Healthy,
    };

    let mut components = HashMap::new();
    components.insert("database".to_string(), db_component);
    components.insert(
        "mcp".to_string(),
        HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
    );

    SystemHealth {
        status: overall_status,
        components,
    }
}

/// Health service over a database pool
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    /// Create a new health service
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let status = self.check_database_status().await;
        let info = database::get_connection_info(&self.pool).ok();
        get_system_health(status, info)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status(&self.pool)
    }
}
