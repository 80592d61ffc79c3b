use async_trait::async_trait;
use tracing::debug;
use validator::Validate;

use open_wearables_data::database::DatabasePool;
use open_wearables_data::repository::{EventRecordRepository, EventRecordRepositoryTrait};

use crate::entities::conversions;
use crate::entities::{EventRecordQueryParams, QueryResult, SleepSession, Workout};
use super::errors::{format_validation_errors, map_repo_error, ServiceError};

/// Trait for workout and sleep session queries
#[async_trait]
pub trait EventRecordServiceTrait: Send + Sync {
    /// Workouts for a user, most recent first
    async fn get_workouts(
        &self,
        user_id: &str,
        params: EventRecordQueryParams,
    ) -> Result<QueryResult<Workout>, ServiceError>;

    /// Sleep sessions for a user, most recent first
    async fn get_sleep_sessions(
        &self,
        user_id: &str,
        params: EventRecordQueryParams,
    ) -> Result<QueryResult<SleepSession>, ServiceError>;
}

/// Event record service backed by an event record repository
pub struct EventRecordService<R: EventRecordRepositoryTrait> {
    repository: R,
}

impl<R: EventRecordRepositoryTrait> EventRecordService<R> {
    /// Create a new event record service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn validate_params(params: &EventRecordQueryParams) -> Result<(), ServiceError> {
    params
        .validate()
        .map_err(|e| ServiceError::Validation(format_validation_errors(&e)))
}

#[async_trait]
impl<R: EventRecordRepositoryTrait + Send + Sync> EventRecordServiceTrait for EventRecordService<R> {
    async fn get_workouts(
        &self,
        user_id: &str,
        params: EventRecordQueryParams,
    ) -> Result<QueryResult<Workout>, ServiceError> {
        let user_uuid = conversions::parse_string_to_uuid(user_id).map_err(ServiceError::Validation)?;
        validate_params(&params)?;
        debug!("Getting workouts for user {}: {:?}", user_uuid, params);

        let filter = conversions::convert_to_data_event_filter(&params);
        let (data_workouts, total) = self
            .repository
            .get_workouts(user_uuid, filter)
            .await
            .map_err(map_repo_error)?;

        let workouts = data_workouts
            .into_iter()
            .map(conversions::convert_to_domain_workout)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)?;

        Ok(QueryResult::new(workouts, total, params.start_datetime, params.end_datetime))
    }

    async fn get_sleep_sessions(
        &self,
        user_id: &str,
        params: EventRecordQueryParams,
    ) -> Result<QueryResult<SleepSession>, ServiceError> {
        let user_uuid = conversions::parse_string_to_uuid(user_id).map_err(ServiceError::Validation)?;
        validate_params(&params)?;
        debug!("Getting sleep sessions for user {}: {:?}", user_uuid, params);

        let filter = conversions::convert_to_data_event_filter(&EventRecordQueryParams {
            workout_type: None,
            ..params.clone()
        });
        let (data_sessions, total) = self
            .repository
            .get_sleep_sessions(user_uuid, filter)
            .await
            .map_err(map_repo_error)?;

        let sessions = data_sessions
            .into_iter()
            .map(conversions::convert_to_domain_sleep_session)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)?;

        Ok(QueryResult::new(sessions, total, params.start_datetime, params.end_datetime))
    }
}

/// Create an event record service over the given database pool
pub fn create_default_event_record_service(pool: DatabasePool) -> impl EventRecordServiceTrait {
    EventRecordService::new(EventRecordRepository::new(pool))
}
