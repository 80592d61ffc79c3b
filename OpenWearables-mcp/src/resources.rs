//! Static reference resources describing the data the tools can return.

use serde_json::{json, Map, Value};

use open_wearables_domain::entities::{SeriesType, WorkoutType};

use crate::error::ToolError;
use crate::protocol::{McpResource, ResourceContent, ResourceReadResult};

pub const SERIES_TYPES_URI: &str = "health://series-types";
pub const WORKOUT_TYPES_URI: &str = "health://workout-types";

const JSON_MIME: &str = "application/json";

pub fn all_resources() -> Vec<McpResource> {
    vec![
        McpResource {
            uri: SERIES_TYPES_URI.to_string(),
            name: "series-types".to_string(),
            description: Some(
                "All available time-series data types with their units. Use these names when querying time-series data."
                    .to_string(),
            ),
            mime_type: Some(JSON_MIME.to_string()),
        },
        McpResource {
            uri: WORKOUT_TYPES_URI.to_string(),
            name: "workout-types".to_string(),
            description: Some(
                "All available workout types organized by category. Use these names when filtering workouts."
                    .to_string(),
            ),
            mime_type: Some(JSON_MIME.to_string()),
        },
    ]
}

/// Read a resource by URI
pub fn read_resource(uri: &str) -> Result<ResourceReadResult, ToolError> {
    let body = match uri {
        SERIES_TYPES_URI => series_types(),
        WORKOUT_TYPES_URI => workout_types(),
        other => return Err(ToolError::UnknownResource(other.to_string())),
    };

    Ok(ResourceReadResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some(JSON_MIME.to_string()),
            text: Some(serde_json::to_string_pretty(&body)?),
        }],
    })
}

pub fn series_types() -> Value {
    let series_types: Vec<Value> = SeriesType::all()
        .map(|series_type| {
            json!({
                "id": series_type.id(),
                "name": series_type.as_str(),
                "unit": series_type.unit(),
            })
        })
        .collect();

    let categories: Map<String, Value> = SeriesType::categories()
        .into_iter()
        .map(|(category, names)| (category.to_string(), json!(names)))
        .collect();

    json!({
        "series_types": series_types,
        "categories": categories,
    })
}

pub fn workout_types() -> Value {
    let names: Vec<&str> = WorkoutType::all().iter().map(WorkoutType::as_str).collect();

    let categories: Map<String, Value> = WorkoutType::categories()
        .iter()
        .map(|(category, types)| {
            let names: Vec<&str> = types.iter().map(WorkoutType::as_str).collect();
            (category.to_string(), json!(names))
        })
        .collect();

    json!({
        "workout_types": names,
        "categories": categories,
    })
}
