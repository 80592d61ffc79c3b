use async_trait::async_trait;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::event_record::{EventRecordFilter, SleepSession, Workout};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for event records (workouts and sleep sessions)
#[async_trait]
pub trait EventRecordRepositoryTrait {
    /// Get workouts, most recent first, with the total number of matches
    async fn get_workouts(
        &self,
        user_id: Uuid,
        filter: EventRecordFilter,
    ) -> Result<(Vec<Workout>, usize), RepositoryError>;

    /// Get sleep sessions, most recent first, with the total number of matches
    async fn get_sleep_sessions(
        &self,
        user_id: Uuid,
        filter: EventRecordFilter,
    ) -> Result<(Vec<SleepSession>, usize), RepositoryError>;
}

/// SQLite backed event record repository
#[derive(Debug, Clone)]
pub struct EventRecordRepository {
    pool: DatabasePool,
}

impl EventRecordRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRecordRepositoryTrait for EventRecordRepository {
    async fn get_workouts(
        &self,
        user_id: Uuid,
        filter: EventRecordFilter,
    ) -> Result<(Vec<Workout>, usize), RepositoryError> {
        DatabaseStorage::get_workouts(&self.pool, &user_id, &filter)
    }

    async fn get_sleep_sessions(
        &self,
        user_id: Uuid,
        filter: EventRecordFilter,
    ) -> Result<(Vec<SleepSession>, usize), RepositoryError> {
        DatabaseStorage::get_sleep_sessions(&self.pool, &user_id, &filter)
    }
}

/// Mock event record repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use crate::repository::in_memory::InMemoryStorage;

    #[derive(Debug, Clone, Default)]
    pub struct MockEventRecordRepository {
        storage: InMemoryStorage,
    }

    impl MockEventRecordRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_workouts(self, workouts: Vec<Workout>) -> Self {
            for workout in workouts {
                self.storage.add_workout(workout).expect("seed mock workouts");
            }
            self
        }

        pub fn with_sleep_sessions(self, sessions: Vec<SleepSession>) -> Self {
            for session in sessions {
                self.storage.add_sleep_session(session).expect("seed mock sleep sessions");
            }
            self
        }
    }

    #[async_trait]
    impl EventRecordRepositoryTrait for MockEventRecordRepository {
        async fn get_workouts(
            &self,
            user_id: Uuid,
            filter: EventRecordFilter,
        ) -> Result<(Vec<Workout>, usize), RepositoryError> {
            self.storage.get_workouts(&user_id, &filter)
        }

        async fn get_sleep_sessions(
            &self,
            user_id: Uuid,
            filter: EventRecordFilter,
        ) -> Result<(Vec<SleepSession>, usize), RepositoryError> {
            self.storage.get_sleep_sessions(&user_id, &filter)
        }
    }
}
