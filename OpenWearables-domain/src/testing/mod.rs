// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;

use async_trait::async_trait;

// Re-export useful test mocks from the data layer
pub use open_wearables_data::repository::tests::{
    InMemoryStorage, MockEventRecordRepository, MockTimeSeriesRepository, MockUserRepository,
};

use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::{EventRecordService, TimeSeriesService, UserService};

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Database component status
    database_status: ComponentStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let status = match self.database_status {
            ComponentStatus::Healthy => SystemStatus::Healthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        };

        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database failed its integrity check".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a user service over in-memory users
pub fn create_mock_user_service(repository: MockUserRepository) -> UserService<MockUserRepository> {
    UserService::new(repository)
}

/// Factory function to create an event record service over in-memory records
pub fn create_mock_event_record_service(
    repository: MockEventRecordRepository,
) -> EventRecordService<MockEventRecordRepository> {
    EventRecordService::new(repository)
}

/// Factory function to create a time-series service over in-memory samples
pub fn create_mock_timeseries_service(
    repository: MockTimeSeriesRepository,
) -> TimeSeriesService<MockTimeSeriesRepository> {
    TimeSeriesService::new(repository)
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> MockHealthService {
    MockHealthService::new()
}
