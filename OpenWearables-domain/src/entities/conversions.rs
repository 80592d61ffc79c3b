use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use open_wearables_data::models::event_record as data_event;
use open_wearables_data::models::format_timestamp;
use open_wearables_data::models::timeseries as data_timeseries;
use open_wearables_data::models::user as data_user;

use super::common::{EventRecordQueryParams, TimeSeriesQueryParams};
use super::event_record::{DataSource, SleepSession, SleepStages, Workout};
use super::series_type::SeriesType;
use super::timeseries::TimeSeriesSample;
use super::user::User;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Helper function to safely parse a string ID to UUID
///
/// When an invalid UUID is provided, it returns a descriptive error message.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id.trim()).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Parse an ISO 8601 date or date-time supplied by a client.
///
/// Accepts a bare date (`2024-01-01`, read as midnight UTC), RFC 3339 with a
/// `Z` suffix or a numeric offset, and a naive date-time without offset
/// (read as UTC), with or without fractional seconds.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!(
        "Invalid datetime format: '{}'. Use ISO 8601, e.g. '2024-01-01' or '2024-01-01T00:00:00Z'",
        value
    ))
}

/// Parse a timestamp read back from storage
fn parse_stored_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| format!("Corrupt stored timestamp '{}': {}", value, e))
}

fn parse_stored_optional(value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    value.map(parse_stored_timestamp).transpose()
}

fn parse_stored_uuid(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|_| format!("Corrupt stored identifier: {}", value))
}

/// Convert from data model to domain entity for a user
pub fn convert_to_domain_user(data_user: data_user::User) -> Result<User, String> {
    Ok(User {
        id: parse_stored_uuid(&data_user.id)?,
        created_at: parse_stored_timestamp(&data_user.created_at)?,
        email: data_user.email,
        first_name: data_user.first_name,
        last_name: data_user.last_name,
        external_user_id: data_user.external_user_id,
    })
}

/// Convert from data model to domain entity for a workout
pub fn convert_to_domain_workout(data_workout: data_event::Workout) -> Result<Workout, String> {
    Ok(Workout {
        id: parse_stored_uuid(&data_workout.id)?,
        start_time: parse_stored_timestamp(&data_workout.start_time)?,
        end_time: parse_stored_optional(data_workout.end_time.as_deref())?,
        workout_type: data_workout.workout_type,
        name: data_workout.name,
        duration_seconds: data_workout.duration_seconds,
        source: DataSource {
            provider: data_workout.source_provider,
            device: data_workout.source_device,
        },
        calories_kcal: data_workout.calories_kcal,
        distance_meters: data_workout.distance_meters,
        avg_heart_rate_bpm: data_workout.avg_heart_rate_bpm,
        max_heart_rate_bpm: data_workout.max_heart_rate_bpm,
        elevation_gain_meters: data_workout.elevation_gain_meters,
    })
}

/// Convert from data model to domain entity for a sleep session
pub fn convert_to_domain_sleep_session(data_session: data_event::SleepSession) -> Result<SleepSession, String> {
    let stages = SleepStages {
        deep_seconds: data_session.deep_seconds,
        light_seconds: data_session.light_seconds,
        rem_seconds: data_session.rem_seconds,
        awake_seconds: data_session.awake_seconds,
    };
    let has_stages = stages != SleepStages::default();

    Ok(SleepSession {
        id: parse_stored_uuid(&data_session.id)?,
        start_time: parse_stored_timestamp(&data_session.start_time)?,
        end_time: parse_stored_optional(data_session.end_time.as_deref())?,
        duration_seconds: data_session.duration_seconds,
        efficiency_percent: data_session.efficiency_percent,
        is_nap: data_session.is_nap,
        source: DataSource {
            provider: data_session.source_provider,
            device: data_session.source_device,
        },
        stages: has_stages.then_some(stages),
    })
}

/// Convert from data model to domain entity for a time-series sample
pub fn convert_to_domain_sample(data_sample: data_timeseries::TimeSeriesSample) -> Result<TimeSeriesSample, String> {
    Ok(TimeSeriesSample {
        id: parse_stored_uuid(&data_sample.id)?,
        timestamp: parse_stored_timestamp(&data_sample.timestamp)?,
        series_type: data_sample.series_type.parse::<SeriesType>()?,
        value: data_sample.value,
        unit: data_sample.unit,
    })
}

/// Convert query parameters to the data layer's event record filter
pub fn convert_to_data_event_filter(params: &EventRecordQueryParams) -> data_event::EventRecordFilter {
    data_event::EventRecordFilter {
        start_time: params.start_datetime.as_ref().map(format_timestamp),
        end_time: params.end_datetime.as_ref().map(format_timestamp),
        workout_type: params.workout_type.clone(),
        limit: params.limit as usize,
        offset: 0,
    }
}

/// Convert query parameters to the data layer's time-series filter
pub fn convert_to_data_timeseries_filter(
    series_types: &[SeriesType],
    params: &TimeSeriesQueryParams,
) -> data_timeseries::TimeSeriesFilter {
    data_timeseries::TimeSeriesFilter {
        series_types: series_types.iter().map(|series_type| series_type.as_str().to_string()).collect(),
        start_time: format_timestamp(&params.start_datetime),
        end_time: format_timestamp(&params.end_datetime),
        limit: params.limit as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_string_to_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_string_to_uuid(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_string_to_uuid("not-a-uuid").unwrap_err(),
            "Invalid UUID format: not-a-uuid"
        );
    }

    #[test]
    fn test_parse_datetime_accepts_iso_variants() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-01").unwrap(), midnight);
        assert_eq!(parse_datetime("2024-01-01T00:00:00Z").unwrap(), midnight);
        assert_eq!(parse_datetime("2024-01-01T02:00:00+02:00").unwrap(), midnight);
        assert_eq!(parse_datetime("2024-01-01T00:00:00").unwrap(), midnight);
        assert_eq!(parse_datetime("2024-01-01T00:00:00.000").unwrap(), midnight);
        assert_eq!(parse_datetime(" 2024-01-01 ").unwrap(), midnight);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2024-13-01").is_err());
        assert!(parse_datetime("").is_err());
    }

    #[test]
    fn test_sleep_stages_absent_when_all_empty() {
        let session = data_event::SleepSession {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            start_time: "2024-01-01T22:00:00.000Z".to_string(),
            end_time: None,
            duration_seconds: Some(3600),
            efficiency_percent: None,
            is_nap: true,
            source_provider: None,
            source_device: None,
            deep_seconds: None,
            light_seconds: None,
            rem_seconds: None,
            awake_seconds: None,
        };
        let converted = convert_to_domain_sleep_session(session.clone()).unwrap();
        assert!(converted.stages.is_none());

        let converted = convert_to_domain_sleep_session(data_event::SleepSession {
            rem_seconds: Some(600),
            ..session
        })
        .unwrap();
        assert_eq!(converted.stages.unwrap().rem_seconds, Some(600));
    }

    #[test]
    fn test_event_filter_uses_storage_format() {
        let params = EventRecordQueryParams {
            start_datetime: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            limit: 50,
            ..Default::default()
        };
        let filter = convert_to_data_event_filter(&params);
        assert_eq!(filter.start_time.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert!(filter.end_time.is_none());
        assert_eq!(filter.limit, 50);
    }
}
