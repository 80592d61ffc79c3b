use serde::{Deserialize, Serialize};

/// Storage model for a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier for the workout
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Workout type name (e.g. `running`)
    pub workout_type: Option<String>,

    /// Provider supplied title
    pub name: Option<String>,

    /// When the workout started (stored timestamp format)
    pub start_time: String,

    /// When the workout ended
    pub end_time: Option<String>,

    /// Total duration in seconds
    pub duration_seconds: Option<i64>,

    /// Data provider (e.g. garmin, apple)
    pub source_provider: Option<String>,

    /// Recording device
    pub source_device: Option<String>,

    pub calories_kcal: Option<f64>,
    pub distance_meters: Option<f64>,
    pub avg_heart_rate_bpm: Option<i64>,
    pub max_heart_rate_bpm: Option<i64>,
    pub elevation_gain_meters: Option<f64>,
}

/// Storage model for a sleep session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    /// Unique identifier for the session
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// When the session started (stored timestamp format)
    pub start_time: String,

    /// When the session ended
    pub end_time: Option<String>,

    /// Total duration in seconds
    pub duration_seconds: Option<i64>,

    /// Time asleep divided by time in bed, as a percentage
    pub efficiency_percent: Option<f64>,

    /// Whether the session is a daytime nap
    pub is_nap: bool,

    pub source_provider: Option<String>,
    pub source_device: Option<String>,

    // Sleep stage breakdown in seconds
    pub deep_seconds: Option<i64>,
    pub light_seconds: Option<i64>,
    pub rem_seconds: Option<i64>,
    pub awake_seconds: Option<i64>,
}

/// Filter for workout and sleep session queries.
///
/// Time bounds are inclusive and apply to `start_time`. `workout_type` is
/// ignored for sleep sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecordFilter {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub workout_type: Option<String>,
    pub limit: usize,
    pub offset: usize,
}
