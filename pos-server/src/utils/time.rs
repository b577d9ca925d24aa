//! Business-timezone date helpers
//!
//! All date → timestamp conversion happens at the API layer; repositories
//! only receive `i64` Unix millis.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a `YYYY-MM-DD` date string
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Local midnight of `date` in `tz`, as Unix millis.
///
/// DST gap fallback: if local midnight does not exist, use UTC midnight.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of the day after `date`; callers use `< end` (exclusive).
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Inclusive local date range → `[start, end)` millis
pub fn date_range_millis(from: NaiveDate, to: NaiveDate, tz: Tz) -> AppResult<(i64, i64)> {
    if from > to {
        return Err(AppError::validation(format!(
            "Invalid range: from ({from}) is after to ({to})"
        )));
    }
    Ok((day_start_millis(from, tz), day_end_millis(to, tz)))
}

/// Window starts (millis) for today, this week (Sunday start) and this month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindows {
    pub day_start: i64,
    pub week_start: i64,
    pub month_start: i64,
}

/// Compute the current sales windows for `now` in the business timezone.
pub fn sales_windows(now: DateTime<Utc>, tz: Tz) -> SalesWindows {
    let today = tz.from_utc_datetime(&now.naive_utc()).date_naive();
    let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
    let week_start = today - Duration::days(days_since_sunday);
    let month_start = today.with_day(1).unwrap_or(today);

    SalesWindows {
        day_start: day_start_millis(today, tz),
        week_start: day_start_millis(week_start, tz),
        month_start: day_start_millis(month_start, tz),
    }
}

/// Format millis as local `YYYY-MM-DD HH:MM`
pub fn format_millis(millis: i64, tz: Tz) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn day_bounds_follow_timezone() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let utc_start = day_start_millis(date, Tz::UTC);
        let colombo_start = day_start_millis(date, chrono_tz::Asia::Colombo);
        // Colombo is UTC+5:30
        assert_eq!(utc_start - colombo_start, 5 * 3_600_000 + 30 * 60_000);
        assert_eq!(day_end_millis(date, Tz::UTC) - utc_start, 86_400_000);
    }

    #[test]
    fn range_rejects_inverted_dates() {
        let a = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(date_range_millis(a, b, Tz::UTC).is_err());
        let (start, end) = date_range_millis(b, a, Tz::UTC).unwrap();
        assert_eq!(end - start, 2 * 86_400_000);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-06-05 is a Wednesday
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap();
        let w = sales_windows(now, Tz::UTC);
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(w.week_start, day_start_millis(sunday, Tz::UTC));
        assert_eq!(w.month_start, day_start_millis(first, Tz::UTC));
        assert_eq!(
            w.day_start,
            day_start_millis(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(), Tz::UTC)
        );
    }
}
