//! Summary tools. Each fetches a bounded batch of records for the period and
//! hands it to the pure aggregations in the domain crate.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use open_wearables_domain::entities::{EventRecordQueryParams, Period, SeriesType, TimeSeriesQueryParams};
use open_wearables_domain::services::analytics;

use super::{parse_datetime, tool};
use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

const SUMMARY_WORKOUT_LIMIT: u32 = 500;
const SUMMARY_SLEEP_LIMIT: u32 = 100;
const SUMMARY_SAMPLE_LIMIT: u32 = 10_000;

fn period_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {"type": "string", "description": "The UUID of the user"},
            "start_date": {"type": "string", "description": "Start date in ISO 8601 format (e.g., '2024-01-01')"},
            "end_date": {"type": "string", "description": "End date in ISO 8601 format"}
        },
        "required": ["user_id", "start_date", "end_date"]
    })
}

pub(super) fn definitions() -> Vec<McpTool> {
    vec![
        tool(
            "get_workout_summary",
            "Get aggregated workout statistics for a user over a date range: totals, duration and breakdown by type.",
            period_schema(),
        ),
        tool(
            "get_sleep_summary",
            "Get aggregated sleep statistics for a user over a date range: average duration, efficiency and stages.",
            period_schema(),
        ),
        tool(
            "get_heart_rate_stats",
            "Get heart rate statistics (min, max, average) for a user over a date range.",
            period_schema(),
        ),
        tool(
            "get_activity_summary",
            "Get activity summary including steps, energy and exercise time for a user over a date range.",
            period_schema(),
        ),
    ]
}

#[derive(Debug, Deserialize)]
pub(super) struct PeriodArgs {
    user_id: String,
    start_date: String,
    end_date: String,
}

impl PeriodArgs {
    fn event_params(&self, limit: u32) -> Result<EventRecordQueryParams, ToolError> {
        Ok(EventRecordQueryParams {
            start_datetime: Some(parse_datetime(&self.start_date)?),
            end_datetime: Some(parse_datetime(&self.end_date)?),
            workout_type: None,
            limit,
        })
    }

    fn series_params(&self) -> Result<TimeSeriesQueryParams, ToolError> {
        Ok(TimeSeriesQueryParams {
            start_datetime: parse_datetime(&self.start_date)?,
            end_datetime: parse_datetime(&self.end_date)?,
            limit: SUMMARY_SAMPLE_LIMIT,
        })
    }

    fn period(&self) -> Period {
        Period::new(self.start_date.clone(), self.end_date.clone())
    }
}

#[instrument(skip(ctx))]
pub(super) async fn get_workout_summary(ctx: &ServerContext, args: PeriodArgs) -> Result<Value, ToolError> {
    let params = args.event_params(SUMMARY_WORKOUT_LIMIT)?;
    let result = ctx.events.get_workouts(&args.user_id, params).await?;
    Ok(serde_json::to_value(analytics::workout_summary(&result.data, args.period()))?)
}

#[instrument(skip(ctx))]
pub(super) async fn get_sleep_summary(ctx: &ServerContext, args: PeriodArgs) -> Result<Value, ToolError> {
    let params = args.event_params(SUMMARY_SLEEP_LIMIT)?;
    let result = ctx.events.get_sleep_sessions(&args.user_id, params).await?;
    Ok(serde_json::to_value(analytics::sleep_summary(&result.data, args.period()))?)
}

#[instrument(skip(ctx))]
pub(super) async fn get_heart_rate_stats(ctx: &ServerContext, args: PeriodArgs) -> Result<Value, ToolError> {
    let types = [SeriesType::HeartRate, SeriesType::RestingHeartRate];
    let result = ctx
        .timeseries
        .get_timeseries(&args.user_id, &types, args.series_params()?)
        .await?;
    Ok(serde_json::to_value(analytics::heart_rate_stats(&result.data, args.period()))?)
}

#[instrument(skip(ctx))]
pub(super) async fn get_activity_summary(ctx: &ServerContext, args: PeriodArgs) -> Result<Value, ToolError> {
    let types = [SeriesType::Steps, SeriesType::Energy, SeriesType::ExerciseTime];
    let result = ctx
        .timeseries
        .get_timeseries(&args.user_id, &types, args.series_params()?)
        .await?;
    Ok(serde_json::to_value(analytics::activity_summary(&result.data, args.period()))?)
}
