pub mod analytics;
pub mod errors;
pub mod event_records;
pub mod timeseries;
pub mod users;

// Domain services
// This module contains the query logic behind each MCP tool.

// Re-export service traits and factory functions
pub use errors::ServiceError;
pub use event_records::{create_default_event_record_service, EventRecordService, EventRecordServiceTrait};
pub use timeseries::{create_default_timeseries_service, TimeSeriesService, TimeSeriesServiceTrait};
pub use users::{create_default_user_service, UserService, UserServiceTrait};
