use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::user::User;
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for users
#[async_trait]
pub trait UserRepositoryTrait {
    /// Get one page of users, newest first, with the total number of matches
    async fn get_paginated(
        &self,
        search: Option<String>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<User>, usize), RepositoryError>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
}

/// SQLite backed user repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_paginated(
        &self,
        search: Option<String>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<User>, usize), RepositoryError> {
        debug!("Getting paginated users from database");
        DatabaseStorage::get_users(&self.pool, search.as_deref(), limit, offset)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        DatabaseStorage::get_user_by_id(&self.pool, &id)
    }
}

/// Mock user repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use crate::repository::in_memory::InMemoryStorage;

    /// In-memory implementation of the user repository
    #[derive(Debug, Clone, Default)]
    pub struct MockUserRepository {
        storage: InMemoryStorage,
    }

    impl MockUserRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined users
        pub fn with_users(users: Vec<User>) -> Self {
            let storage = InMemoryStorage::new();
            for user in users {
                storage.add_user(user).expect("seed mock users");
            }
            Self { storage }
        }
    }

    #[async_trait]
    impl UserRepositoryTrait for MockUserRepository {
        async fn get_paginated(
            &self,
            search: Option<String>,
            limit: usize,
            offset: usize,
        ) -> Result<(Vec<User>, usize), RepositoryError> {
            self.storage.get_users(search.as_deref(), limit, offset)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
            self.storage.get_user_by_id(&id)
        }
    }
}
