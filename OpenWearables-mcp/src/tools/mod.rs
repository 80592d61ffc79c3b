//! MCP tool registry.
//!
//! Every tool is read-only. Arguments are decoded into a per-tool struct;
//! results are plain JSON objects which the server wraps into a tool result.

mod analytics;
mod sleep;
mod timeseries;
mod users;
mod workouts;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use open_wearables_domain::entities::conversions;
use open_wearables_domain::entities::{Pagination, QueryMetadata};

use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

/// Definitions of every registered tool, in listing order
pub fn all_tools() -> Vec<McpTool> {
    let mut tools = Vec::new();
    tools.extend(users::definitions());
    tools.extend(workouts::definitions());
    tools.extend(sleep::definitions());
    tools.extend(timeseries::definitions());
    tools.extend(analytics::definitions());
    tools
}

/// Run a tool by name
pub async fn call_tool(ctx: &ServerContext, name: &str, arguments: Value) -> Result<Value, ToolError> {
    match name {
        "list_users" => users::list_users(ctx, parse_args(arguments)?).await,
        "get_user" => users::get_user(ctx, parse_args(arguments)?).await,
        "get_workouts" => workouts::get_workouts(ctx, parse_args(arguments)?).await,
        "get_sleep_sessions" => sleep::get_sleep_sessions(ctx, parse_args(arguments)?).await,
        "get_timeseries" => timeseries::get_timeseries(ctx, parse_args(arguments)?).await,
        "get_heart_rate_data" => timeseries::get_heart_rate_data(ctx, parse_args(arguments)?).await,
        "get_steps_data" => timeseries::get_steps_data(ctx, parse_args(arguments)?).await,
        "get_workout_summary" => analytics::get_workout_summary(ctx, parse_args(arguments)?).await,
        "get_sleep_summary" => analytics::get_sleep_summary(ctx, parse_args(arguments)?).await,
        "get_heart_rate_stats" => analytics::get_heart_rate_stats(ctx, parse_args(arguments)?).await,
        "get_activity_summary" => analytics::get_activity_summary(ctx, parse_args(arguments)?).await,
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

fn tool(name: &str, description: &str, input_schema: Value) -> McpTool {
    McpTool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Decode tool arguments; a missing arguments object counts as empty
fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, ToolError> {
    conversions::parse_datetime(value).map_err(ToolError::InvalidArguments)
}

fn parse_optional_datetime(value: Option<&str>) -> Result<Option<DateTime<Utc>>, ToolError> {
    value.map(parse_datetime).transpose()
}

fn iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn pagination_json(pagination: &Pagination) -> Value {
    json!({
        "has_more": pagination.has_more,
        "total_count": pagination.total_count,
    })
}

fn metadata_json(metadata: &QueryMetadata) -> Value {
    json!({
        "sample_count": metadata.sample_count,
        "start_time": metadata.start_time.map(iso),
        "end_time": metadata.end_time.map(iso),
    })
}

fn default_limit() -> u32 {
    20
}

fn default_series_limit() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashSet;

    #[derive(Debug, Deserialize)]
    struct LimitArgs {
        user_id: String,
        #[serde(default = "default_limit")]
        limit: u32,
    }

    #[test]
    fn test_tool_names_are_unique() {
        let tools = all_tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), 11);
        assert!(names.contains("list_users"));
        assert!(names.contains("get_activity_summary"));
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in all_tools() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_parse_args() {
        let args: LimitArgs = parse_args(json!({"user_id": "abc"})).unwrap();
        assert_eq!(args.user_id, "abc");
        assert_eq!(args.limit, 20);

        let err = parse_args::<LimitArgs>(Value::Null).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(msg) if msg.contains("user_id")));

        let err = parse_args::<LimitArgs>(json!({"user_id": "abc", "limit": -1})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_parse_datetime_reports_invalid_arguments() {
        assert!(parse_datetime("2024-01-01").is_ok());
        assert!(matches!(parse_datetime("yesterday"), Err(ToolError::InvalidArguments(_))));
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
    }
}
