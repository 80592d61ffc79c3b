use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a record came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: Option<String>,
    pub device: Option<String>,
}

/// Domain model for a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    /// Workout type name as recorded by the provider
    #[serde(rename = "type")]
    pub workout_type: Option<String>,
    pub name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub source: DataSource,
    pub calories_kcal: Option<f64>,
    pub distance_meters: Option<f64>,
    pub avg_heart_rate_bpm: Option<i64>,
    pub max_heart_rate_bpm: Option<i64>,
    pub elevation_gain_meters: Option<f64>,
}

/// Time spent in each sleep stage, in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepStages {
    pub deep_seconds: Option<i64>,
    pub light_seconds: Option<i64>,
    pub rem_seconds: Option<i64>,
    pub awake_seconds: Option<i64>,
}

/// Domain model for a sleep session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub efficiency_percent: Option<f64>,
    pub is_nap: bool,
    pub source: DataSource,
    /// `None` when the provider reported no stage breakdown at all
    pub stages: Option<SleepStages>,
}
