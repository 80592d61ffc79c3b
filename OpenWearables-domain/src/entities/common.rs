use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Paging and search parameters for listing users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQueryParams {
    /// 1-based page number
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    /// Page size
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,

    /// Case-insensitive substring matched against email and names
    pub search: Option<String>,
}

impl Default for UserQueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
        }
    }
}

/// Filters for workout and sleep session queries
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventRecordQueryParams {
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,

    /// Workout type name, matched case-insensitively. Ignored for sleep.
    pub workout_type: Option<String>,

    #[validate(range(min = 1, max = 500, message = "Limit must be between 1 and 500"))]
    pub limit: u32,
}

impl Default for EventRecordQueryParams {
    fn default() -> Self {
        Self {
            start_datetime: None,
            end_datetime: None,
            workout_type: None,
            limit: 20,
        }
    }
}

/// Time window for time-series queries. Both bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TimeSeriesQueryParams {
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,

    #[validate(range(min = 1, max = 10000, message = "Limit must be between 1 and 10000"))]
    pub limit: u32,
}

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` items
    pub fn pages(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }
}

/// Paging information for a cursor-less query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub has_more: bool,
    pub total_count: usize,
}

/// Describes the window a query covered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub sample_count: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Result of a record or time-series query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub metadata: QueryMetadata,
}

impl<T> QueryResult<T> {
    /// Build a result from the returned rows and the total number of matches
    pub fn new(
        data: Vec<T>,
        total_count: usize,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        let sample_count = data.len();
        Self {
            data,
            pagination: Pagination {
                has_more: total_count > sample_count,
                total_count,
            },
            metadata: QueryMetadata {
                sample_count,
                start_time,
                end_time,
            },
        }
    }
}

/// Reporting period echoed back verbatim by summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}
