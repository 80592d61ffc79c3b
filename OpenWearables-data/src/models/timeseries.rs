use serde::{Deserialize, Serialize};

/// Storage model for a single time-series data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    /// Unique identifier for the sample
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// When the sample was recorded (stored timestamp format)
    pub timestamp: String,

    /// Series type name (e.g. `heart_rate`)
    pub series_type: String,

    /// Measured value
    pub value: f64,

    /// Unit of the value
    pub unit: String,
}

/// Filter for time-series queries. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFilter {
    pub series_types: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub limit: usize,
}
