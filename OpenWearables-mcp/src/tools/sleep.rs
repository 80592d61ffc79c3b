use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use open_wearables_domain::entities::{EventRecordQueryParams, SleepSession};
use open_wearables_domain::services::analytics::round_to;

use super::{default_limit, iso, metadata_json, pagination_json, parse_optional_datetime, tool};
use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

const MAX_SLEEP_SESSIONS: u32 = 100;

pub(super) fn definitions() -> Vec<McpTool> {
    vec![tool(
        "get_sleep_sessions",
        "Get sleep sessions for a user within a date range. Each session includes duration, efficiency and sleep stage breakdown.",
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "The UUID of the user"},
                "start_date": {"type": "string", "description": "Start date in ISO 8601 format (e.g., '2024-01-01')"},
                "end_date": {"type": "string", "description": "End date in ISO 8601 format"},
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
pub(super) struct GetSleepSessionsArgs {
    user_id: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[instrument(skip(ctx))]
pub(super) async fn get_sleep_sessions(
    ctx: &ServerContext,
    args: GetSleepSessionsArgs,
) -> Result<Value, ToolError> {
    let params = EventRecordQueryParams {
        start_datetime: parse_optional_datetime(args.start_date.as_deref())?,
        end_datetime: parse_optional_datetime(args.end_date.as_deref())?,
        workout_type: None,
        limit: args.limit.min(MAX_SLEEP_SESSIONS),
    };
    let result = ctx.events.get_sleep_sessions(&args.user_id, params).await?;

    Ok(json!({
        "sleep_sessions": result.data.iter().map(session_json).collect::<Vec<_>>(),
        "pagination": pagination_json(&result.pagination),
        "metadata": metadata_json(&result.metadata),
    }))
}

fn minutes(seconds: Option<i64>) -> Option<f64> {
    seconds
        .filter(|seconds| *seconds != 0)
        .map(|seconds| round_to(seconds as f64 / 60.0, 1))
}

fn session_json(session: &SleepSession) -> Value {
    let stages = session.stages.as_ref().map(|stages| {
        json!({
            "deep_seconds": stages.deep_seconds,
            "deep_minutes": minutes(stages.deep_seconds),
            "light_seconds": stages.light_seconds,
            "light_minutes": minutes(stages.light_seconds),
            "rem_seconds": stages.rem_seconds,
            "rem_minutes": minutes(stages.rem_seconds),
            "awake_seconds": stages.awake_seconds,
            "awake_minutes": minutes(stages.awake_seconds),
        })
    });

    json!({
        "id": session.id.to_string(),
        "start_time": iso(session.start_time),
        "end_time": session.end_time.map(iso),
        "duration_seconds": session.duration_seconds,
        "duration_hours": session
            .duration_seconds
            .filter(|seconds| *seconds != 0)
            .map(|seconds| round_to(seconds as f64 / 3600.0, 2)),
        "efficiency_percent": session.efficiency_percent,
        "is_nap": session.is_nap,
        "source": {
            "provider": session.source.provider,
            "device": session.source.device,
        },
        "stages": stages,
    })
}
