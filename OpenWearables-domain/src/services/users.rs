use async_trait::async_trait;
use tracing::{debug, error};
use validator::Validate;

use open_wearables_data::database::DatabasePool;
use open_wearables_data::repository::{UserRepository, UserRepositoryTrait};

use crate::entities::conversions;
use crate::entities::{Page, User, UserQueryParams};
use super::errors::{format_validation_errors, map_repo_error, ServiceError};

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// List users one page at a time, newest first
    async fn list_users(&self, params: UserQueryParams) -> Result<Page<User>, ServiceError>;

    /// Get a single user by ID
    async fn get_user(&self, id: &str) -> Result<User, ServiceError>;
}

/// User service backed by a user repository
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
}

impl<R: UserRepositoryTrait> UserService<R> {
    /// Create a new user service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> UserServiceTrait for UserService<R> {
    async fn list_users(&self, params: UserQueryParams) -> Result<Page<User>, ServiceError> {
        params
            .validate()
            .map_err(|e| ServiceError::Validation(format_validation_errors(&e)))?;

        let limit = params.limit as usize;
        let offset = (params.page as usize - 1) * limit;
        let search = params.search.filter(|term| !term.trim().is_empty());
        debug!("Listing users: page={}, limit={}, search={:?}", params.page, limit, search);

        let (data_users, total) = self
            .repository
            .get_paginated(search, limit, offset)
            .await
            .map_err(map_repo_error)?;

        let items = data_users
            .into_iter()
            .map(conversions::convert_to_domain_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("Failed to convert stored user: {}", e);
                ServiceError::Repository(e)
            })?;

        Ok(Page {
            items,
            total,
            page: params.page as usize,
            limit,
        })
    }

    async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        let user_id = conversions::parse_string_to_uuid(id).map_err(ServiceError::Validation)?;

        let data_user = self
            .repository
            .get_by_id(user_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", id)))?;

        conversions::convert_to_domain_user(data_user).map_err(ServiceError::Repository)
    }
}

/// Create a user service over the given database pool
pub fn create_default_user_service(pool: DatabasePool) -> impl UserServiceTrait {
    UserService::new(UserRepository::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use open_wearables_data::models::user as data_user;
    use open_wearables_data::repository::tests::MockUserRepository;
    use uuid::Uuid;

    fn stored_user(email: &str, created_at: &str) -> data_user::User {
        data_user::User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            external_user_id: Some("ext-1".to_string()),
            created_at: created_at.to_string(),
        }
    }

    fn service_with(count: usize) -> UserService<MockUserRepository> {
        let users = (0..count)
            .map(|i| stored_user(&format!("user{}@example.com", i), &format!("2024-01-{:02}T00:00:00.000Z", i + 1)))
            .collect();
        UserService::new(MockUserRepository::with_users(users))
    }

    #[tokio::test]
    async fn test_list_users_pages() {
        let service = service_with(5);

        let page = service
            .list_users(UserQueryParams { page: 2, limit: 2, search: None })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pages(), 3);
        // Newest first: page two starts at the third newest
        assert_eq!(page.items[0].email, "user2@example.com");

        let page = service
            .list_users(UserQueryParams { page: 4, limit: 2, search: None })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_list_users_search_and_blank_search() {
        let service = service_with(3);

        let page = service
            .list_users(UserQueryParams { search: Some("USER1".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let page = service
            .list_users(UserQueryParams { search: Some("  ".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_list_users_rejects_bad_params() {
        let service = service_with(1);
        let err = service
            .list_users(UserQueryParams { limit: 0, ..Default::default() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Limit must be between 1 and 100"));
    }

    #[tokio::test]
    async fn test_get_user() {
        let user = stored_user("ann@example.com", "2024-01-01T00:00:00.000Z");
        let id = user.id.clone();
        let service = UserService::new(MockUserRepository::with_users(vec![user]));

        let found = service.get_user(&id).await.unwrap();
        assert_eq!(found.email, "ann@example.com");
        assert_eq!(found.external_user_id.as_deref(), Some("ext-1"));

        let missing = Uuid::new_v4().to_string();
        let err = service.get_user(&missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), format!("User with ID {} not found", missing));

        let err = service.get_user("abc").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(err.to_string().contains("Invalid UUID format: abc"));
    }
}
