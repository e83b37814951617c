//! Shared SQLite helpers for the stores.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) a database file.
pub(crate) fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Open a private in-memory database.
pub(crate) fn open_in_memory() -> rusqlite::Result<Connection> {
    Connection::open_in_memory()
}

/// Fixed-width RFC3339 so stored timestamps sort lexicographically.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(1500);
        assert!(format_timestamp(&a) < format_timestamp(&b));
        assert_eq!(format_timestamp(&a).len(), format_timestamp(&b).len());
    }

    #[test]
    fn test_parse_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(&now));
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
