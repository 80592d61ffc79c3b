use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use open_wearables_domain::entities::{SeriesType, TimeSeriesQueryParams};

use super::{default_series_limit, iso, metadata_json, pagination_json, parse_datetime, tool};
use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

const MAX_SAMPLES: u32 = 1000;

pub(super) fn definitions() -> Vec<McpTool> {
    vec![
        tool(
            "get_timeseries",
            "Get time-series health data for a user. Each data point includes timestamp, type, value and unit. \
             Use the health://series-types resource to see all available types.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "The UUID of the user"},
                    "series_types": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Series types to retrieve (e.g., ['heart_rate', 'steps'])"
                    },
                    "start_datetime": {
                        "type": "string",
                        "description": "Start datetime in ISO 8601 format (e.g., '2024-01-01T00:00:00Z')"
                    },
                    "end_datetime": {"type": "string", "description": "End datetime in ISO 8601 format"},
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of data points to return (default 100, max 1000)",
                        "default": 100
                    }
                },
                "required": ["user_id", "series_types", "start_datetime", "end_datetime"]
            }),
        ),
        tool(
            "get_heart_rate_data",
            "Get heart rate data points for a user, optionally including resting heart rate.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "The UUID of the user"},
                    "start_datetime": {"type": "string", "description": "Start datetime in ISO 8601 format"},
                    "end_datetime": {"type": "string", "description": "End datetime in ISO 8601 format"},
                    "include_resting": {
                        "type": "boolean",
                        "description": "Also include resting heart rate data (default true)",
                        "default": true
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of data points (default 100, max 1000)",
                        "default": 100
                    }
                },
                "required": ["user_id", "start_datetime", "end_datetime"]
            }),
        ),
        tool(
            "get_steps_data",
            "Get step count data points for a user.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "The UUID of the user"},
                    "start_datetime": {"type": "string", "description": "Start datetime in ISO 8601 format"},
                    "end_datetime": {"type": "string", "description": "End datetime in ISO 8601 format"},
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of data points (default 100, max 1000)",
                        "default": 100
                    }
                },
                "required": ["user_id", "start_datetime", "end_datetime"]
            }),
        ),
    ]
}

#[derive(Debug, Deserialize)]
pub(super) struct GetTimeSeriesArgs {
    user_id: String,
    series_types: Vec<String>,
    start_datetime: String,
    end_datetime: String,
    #[serde(default = "default_series_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct GetHeartRateDataArgs {
    user_id: String,
    start_datetime: String,
    end_datetime: String,
    #[serde(default = "default_include_resting")]
    include_resting: bool,
    #[serde(default = "default_series_limit")]
    limit: u32,
}

fn default_include_resting() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct GetStepsDataArgs {
    user_id: String,
    start_datetime: String,
    end_datetime: String,
    #[serde(default = "default_series_limit")]
    limit: u32,
}

fn window(start: &str, end: &str, limit: u32) -> Result<TimeSeriesQueryParams, ToolError> {
    Ok(TimeSeriesQueryParams {
        start_datetime: parse_datetime(start)?,
        end_datetime: parse_datetime(end)?,
        limit: limit.min(MAX_SAMPLES),
    })
}

#[instrument(skip(ctx))]
pub(super) async fn get_timeseries(ctx: &ServerContext, args: GetTimeSeriesArgs) -> Result<Value, ToolError> {
    let params = window(&args.start_datetime, &args.end_datetime, args.limit)?;

    let types: Vec<SeriesType> = args
        .series_types
        .iter()
        .filter_map(|name| match name.parse::<SeriesType>() {
            Ok(series_type) => Some(series_type),
            Err(e) => {
                warn!("Skipping series type: {}", e);
                None
            }
        })
        .collect();

    if types.is_empty() {
        return Ok(json!({
            "error": "No valid series types provided. Valid types include: heart_rate, steps, resting_heart_rate, etc.",
            "data": [],
        }));
    }

    let result = ctx.timeseries.get_timeseries(&args.user_id, &types, params).await?;

    let data: Vec<Value> = result
        .data
        .iter()
        .map(|sample| {
            json!({
                "timestamp": iso(sample.timestamp),
                "type": sample.series_type.as_str(),
                "value": sample.value,
                "unit": sample.unit,
            })
        })
        .collect();

    let mut metadata = metadata_json(&result.metadata);
    metadata["requested_types"] = json!(args.series_types);

    Ok(json!({
        "data": data,
        "pagination": pagination_json(&result.pagination),
        "metadata": metadata,
    }))
}

#[instrument(skip(ctx))]
pub(super) async fn get_heart_rate_data(
    ctx: &ServerContext,
    args: GetHeartRateDataArgs,
) -> Result<Value, ToolError> {
    let params = window(&args.start_datetime, &args.end_datetime, args.limit)?;

    let mut types = vec![SeriesType::HeartRate];
    if args.include_resting {
        types.push(SeriesType::RestingHeartRate);
    }

    let result = ctx.timeseries.get_timeseries(&args.user_id, &types, params).await?;

    let data: Vec<Value> = result
        .data
        .iter()
        .map(|sample| {
            json!({
                "timestamp": iso(sample.timestamp),
                "type": sample.series_type.as_str(),
                "value_bpm": sample.value,
            })
        })
        .collect();

    Ok(json!({
        "heart_rate_data": data,
        "sample_count": result.data.len(),
        "has_more": result.pagination.has_more,
    }))
}

#[instrument(skip(ctx))]
pub(super) async fn get_steps_data(ctx: &ServerContext, args: GetStepsDataArgs) -> Result<Value, ToolError> {
    let params = window(&args.start_datetime, &args.end_datetime, args.limit)?;

    let result = ctx
        .timeseries
        .get_timeseries(&args.user_id, &[SeriesType::Steps], params)
        .await?;

    let data: Vec<Value> = result
        .data
        .iter()
        .map(|sample| {
            json!({
                "timestamp": iso(sample.timestamp),
                "steps": sample.value as i64,
            })
        })
        .collect();

    Ok(json!({
        "steps_data": data,
        "sample_count": result.data.len(),
        "has_more": result.pagination.has_more,
    }))
}
