use chrono::{DateTime, SecondsFormat, Utc};

pub mod event_record;
pub mod timeseries;
pub mod user;

/// Format a timestamp the way every timestamp column is stored.
///
/// Fixed-width UTC with millisecond precision, so lexicographic comparison in
/// SQL matches chronological order.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_is_sortable() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 11, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&early), "2024-01-02T03:04:05.000Z");
        assert!(format_timestamp(&early) < format_timestamp(&late));
    }
}
