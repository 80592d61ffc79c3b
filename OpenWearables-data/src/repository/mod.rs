// Repository module structure
pub mod errors;
mod event_records;
mod storage;
mod timeseries;
mod users;

#[cfg(any(test, feature = "mock"))]
mod in_memory;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use event_records::{EventRecordRepository, EventRecordRepositoryTrait};
pub use storage::DatabaseStorage;
pub use timeseries::{TimeSeriesRepository, TimeSeriesRepositoryTrait};
pub use users::{UserRepository, UserRepositoryTrait};

// Re-export mock repositories for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::event_records::tests::MockEventRecordRepository;
    pub use super::in_memory::InMemoryStorage;
    pub use super::timeseries::tests::MockTimeSeriesRepository;
    pub use super::users::tests::MockUserRepository;
}
