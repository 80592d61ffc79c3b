use async_trait::async_trait;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::timeseries::{TimeSeriesFilter, TimeSeriesSample};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for time-series samples
#[async_trait]
pub trait TimeSeriesRepositoryTrait {
    /// Get samples in ascending time order with the total number of matches
    async fn get_samples(
        &self,
        user_id: Uuid,
        filter: TimeSeriesFilter,
    ) -> Result<(Vec<TimeSeriesSample>, usize), RepositoryError>;
}

/// SQLite backed time-series repository
#[derive(Debug, Clone)]
pub struct TimeSeriesRepository {
    pool: DatabasePool,
}

impl TimeSeriesRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesRepositoryTrait for TimeSeriesRepository {
    async fn get_samples(
        &self,
        user_id: Uuid,
        filter: TimeSeriesFilter,
    ) -> Result<(Vec<TimeSeriesSample>, usize), RepositoryError> {
        DatabaseStorage::get_samples(&self.pool, &user_id, &filter)
    }
}

/// Mock time-series repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use crate::repository::in_memory::InMemoryStorage;

    #[derive(Debug, Clone, Default)]
    pub struct MockTimeSeriesRepository {
        storage: InMemoryStorage,
    }

    impl MockTimeSeriesRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_samples(samples: Vec<TimeSeriesSample>) -> Self {
            let storage = InMemoryStorage::new();
            for sample in samples {
                storage.add_sample(sample).expect("seed mock samples");
            }
            Self { storage }
        }
    }

    #[async_trait]
    impl TimeSeriesRepositoryTrait for MockTimeSeriesRepository {
        async fn get_samples(
            &self,
            user_id: Uuid,
            filter: TimeSeriesFilter,
        ) -> Result<(Vec<TimeSeriesSample>, usize), RepositoryError> {
            self.storage.get_samples(&user_id, &filter)
        }
    }
}
