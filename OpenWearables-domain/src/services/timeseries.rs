use async_trait::async_trait;
use tracing::debug;
use validator::Validate;

use open_wearables_data::database::DatabasePool;
use open_wearables_data::repository::{TimeSeriesRepository, TimeSeriesRepositoryTrait};

use crate::entities::conversions;
use crate::entities::{QueryResult, SeriesType, TimeSeriesQueryParams, TimeSeriesSample};
use super::errors::{format_validation_errors, map_repo_error, ServiceError};

/// Trait for time-series queries
#[async_trait]
pub trait TimeSeriesServiceTrait: Send + Sync {
    /// Samples of the given types inside the window, oldest first
    async fn get_timeseries(
        &self,
        user_id: &str,
        series_types: &[SeriesType],
        params: TimeSeriesQueryParams,
    ) -> Result<QueryResult<TimeSeriesSample>, ServiceError>;
}

/// Time-series service backed by a time-series repository
pub struct TimeSeriesService<R: TimeSeriesRepositoryTrait> {
    repository: R,
}

impl<R: TimeSeriesRepositoryTrait> TimeSeriesService<R> {
    /// Create a new time-series service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TimeSeriesRepositoryTrait + Send + Sync> TimeSeriesServiceTrait for TimeSeriesService<R> {
    async fn get_timeseries(
        &self,
        user_id: &str,
        series_types: &[SeriesType],
        params: TimeSeriesQueryParams,
    ) -> Result<QueryResult<TimeSeriesSample>, ServiceError> {
        let user_uuid = conversions::parse_string_to_uuid(user_id).map_err(ServiceError::Validation)?;
        params
            .validate()
            .map_err(|e| ServiceError::Validation(format_validation_errors(&e)))?;
        debug!(
            "Getting time-series for user {}: types={:?}, params={:?}",
            user_uuid, series_types, params
        );

        let filter = conversions::convert_to_data_timeseries_filter(series_types, &params);
        let (data_samples, total) = self
            .repository
            .get_samples(user_uuid, filter)
            .await
            .map_err(map_repo_error)?;

        let samples = data_samples
            .into_iter()
            .map(conversions::convert_to_domain_sample)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)?;

        Ok(QueryResult::new(
            samples,
            total,
            Some(params.start_datetime),
            Some(params.end_datetime),
        ))
    }
}

/// Create a time-series service over the given database pool
pub fn create_default_timeseries_service(pool: DatabasePool) -> impl TimeSeriesServiceTrait {
    TimeSeriesService::new(TimeSeriesRepository::new(pool))
}
