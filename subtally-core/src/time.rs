//! Time utilities: resolving "today" in the user's zone and week windows.
//!
//! The engine itself never reads a clock; the caller resolves `today` once
//! and passes it down.

use anyhow::Result;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;

/// Calendar date of `now` in an IANA zone like "Asia/Seoul".
pub fn today_in_timezone(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Sunday..=Saturday week containing `today`.
///
/// Fails when the week runs past the representable date range.
pub fn week_bounds(today: NaiveDate) -> crate::error::Result<(NaiveDate, NaiveDate)> {
    let offset = u64::from(today.weekday().num_days_from_sunday());
    let out_of_range = || CoreError::InvalidInput(format!("week of {today} is out of range"));
    let start = today.checked_sub_days(Days::new(offset)).ok_or_else(out_of_range)?;
    let end = start.checked_add_days(Days::new(6)).ok_or_else(out_of_range)?;
    Ok((start, end))
}

/// Parse "YYYY-MM" into (year, month).
pub fn parse_year_month(s: &str) -> Result<(i32, u32)> {
    let (y, m) = s
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("expected YYYY-MM, got '{s}'"))?;
    let year: i32 = y.parse().map_err(|_| anyhow::anyhow!("invalid year in '{s}'"))?;
    let month: u32 = m.parse().map_err(|_| anyhow::anyhow!("invalid month in '{s}'"))?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("month out of range in '{s}'");
    }
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_today_in_seoul_crosses_midnight() {
        // 16:30 UTC is 01:30 next day in Seoul (UTC+9).
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 16, 30, 0).unwrap();
        assert_eq!(today_in_timezone(now, "Asia/Seoul").unwrap(), d(2024, 2, 29));
        assert_eq!(today_in_timezone(now, "UTC").unwrap(), d(2024, 2, 28));
        assert!(today_in_timezone(now, "Mars/Olympus").is_err());
    }

    #[test]
    fn test_week_bounds_sunday_to_saturday() {
        // 2024-02-15 is a Thursday.
        assert_eq!(week_bounds(d(2024, 2, 15)).unwrap(), (d(2024, 2, 11), d(2024, 2, 17)));
        // Sunday starts its own week.
        assert_eq!(week_bounds(d(2024, 2, 11)).unwrap(), (d(2024, 2, 11), d(2024, 2, 17)));
        // Saturday closes it.
        assert_eq!(week_bounds(d(2024, 2, 17)).unwrap(), (d(2024, 2, 11), d(2024, 2, 17)));
        // Week spanning a year boundary.
        assert_eq!(week_bounds(d(2025, 1, 1)).unwrap(), (d(2024, 12, 29), d(2025, 1, 4)));
    }

    #[test]
    fn test_week_bounds_at_date_range_edges() {
        assert!(matches!(week_bounds(NaiveDate::MAX), Err(CoreError::InvalidInput(_))));
        assert!(matches!(week_bounds(NaiveDate::MIN), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!(parse_year_month("2024-02").unwrap(), (2024, 2));
        assert!(parse_year_month("2024-13").is_err());
        assert!(parse_year_month("202402").is_err());
    }
}
