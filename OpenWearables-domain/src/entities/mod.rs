// Domain entities and value objects
pub mod common;
pub mod conversions;
pub mod event_record;
pub mod series_type;
pub mod timeseries;
pub mod user;
pub mod workout_type;

// Re-export common types for easier imports
pub use common::{
    EventRecordQueryParams, Page, Pagination, Period, QueryMetadata, QueryResult, TimeSeriesQueryParams,
    UserQueryParams,
};
pub use event_record::{DataSource, SleepSession, SleepStages, Workout};
pub use series_type::SeriesType;
pub use timeseries::TimeSeriesSample;
pub use user::User;
pub use workout_type::WorkoutType;
