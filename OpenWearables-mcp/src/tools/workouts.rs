use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use open_wearables_domain::entities::{EventRecordQueryParams, Workout};
use open_wearables_domain::services::analytics::round_to;

use super::{default_limit, iso, metadata_json, pagination_json, parse_optional_datetime, tool};
use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

const MAX_WORKOUTS: u32 = 100;

pub(super) fn definitions() -> Vec<McpTool> {
    vec![tool(
        "get_workouts",
        "Get workouts for a user within a date range. Each workout includes type, duration, heart rate stats and distance.",
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "The UUID of the user"},
                "start_date": {
                    "type": "string",
                    "description": "Start date in ISO 8601 format (e.g., '2024-01-01' or '2024-01-01T00:00:00Z')"
                },
                "end_date": {"type": "string", "description": "End date in ISO 8601 format"},
                "workout_type": {
                    "type": "string",
                    "description": "Optional filter by workout type (e.g., 'running', 'cycling', 'swimming')"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results (default 20, max 100)",
                    "default": 20
                }
            },
            "required": ["user_id"]
        }),
    )]
}

#[derive(Debug, Deserialize)]
pub(super) struct GetWorkoutsArgs {
    user_id: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    workout_type: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[instrument(skip(ctx))]
pub(super) async fn get_workouts(ctx: &ServerContext, args: GetWorkoutsArgs) -> Result<Value, ToolError> {
    let params = EventRecordQueryParams {
        start_datetime: parse_optional_datetime(args.start_date.as_deref())?,
        end_datetime: parse_optional_datetime(args.end_date.as_deref())?,
        workout_type: args.workout_type,
        limit: args.limit.min(MAX_WORKOUTS),
    };
    let result = ctx.events.get_workouts(&args.user_id, params).await?;

    Ok(json!({
        "workouts": result.data.iter().map(workout_json).collect::<Vec<_>>(),
        "pagination": pagination_json(&result.pagination),
        "metadata": metadata_json(&result.metadata),
    }))
}

fn workout_json(workout: &Workout) -> Value {
    json!({
        "id": workout.id.to_string(),
        "type": workout.workout_type,
        "name": workout.name,
        "start_time": iso(workout.start_time),
        "end_time": workout.end_time.map(iso),
        "duration_seconds": workout.duration_seconds,
        "duration_minutes": workout
            .duration_seconds
            .filter(|seconds| *seconds != 0)
            .map(|seconds| round_to(seconds as f64 / 60.0, 1)),
        "source": {
            "provider": workout.source.provider,
            "device": workout.source.device,
        },
        "calories_kcal": workout.calories_kcal,
        "distance_meters": workout.distance_meters,
        "distance_km": workout
            .distance_meters
            .filter(|meters| *meters != 0.0)
            .map(|meters| round_to(meters / 1000.0, 2)),
        "avg_heart_rate_bpm": workout.avg_heart_rate_bpm,
        "max_heart_rate_bpm": workout.max_heart_rate_bpm,
        "elevation_gain_meters": workout.elevation_gain_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use open_wearables_domain::entities::DataSource;
    use uuid::Uuid;

    fn workout(duration_seconds: Option<i64>, distance_meters: Option<f64>) -> Workout {
        Workout {
            id: Uuid::nil(),
            workout_type: Some("running".to_string()),
            name: Some("Morning Run".to_string()),
            start_time: Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap(),
            end_time: None,
            duration_seconds,
            source: DataSource {
                provider: Some("garmin".to_string()),
                device: None,
            },
            calories_kcal: None,
            distance_meters,
            avg_heart_rate_bpm: Some(150),
            max_heart_rate_bpm: None,
            elevation_gain_meters: None,
        }
    }

    #[test]
    fn test_workout_json_derived_fields() {
        let json = workout_json(&workout(Some(1830), Some(5123.0)));
        assert_eq!(json["type"], "running");
        assert_eq!(json["start_time"], "2024-01-15T07:00:00+00:00");
        assert_eq!(json["end_time"], Value::Null);
        assert_eq!(json["duration_minutes"], 30.5);
        assert_eq!(json["distance_km"], 5.12);
        assert_eq!(json["source"]["provider"], "garmin");
        assert_eq!(json["source"]["device"], Value::Null);
    }

    #[test]
    fn test_zero_values_have_no_derived_fields() {
        let json = workout_json(&workout(Some(0), Some(0.0)));
        assert_eq!(json["duration_seconds"], 0);
        assert_eq!(json["duration_minutes"], Value::Null);
        assert_eq!(json["distance_km"], Value::Null);
    }
}
