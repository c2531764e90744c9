//! Picks the calendar date whose summary should be fetched

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

use crate::types::{CodetallyError, Result};

/// Before this UTC hour the remote may not have finalized today yet
pub const SAFE_HOUR_UTC: u32 = 6;

/// Why a particular date was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateReason {
    Override,
    ScheduledTrigger,
    EarlyHour,
    Today,
}

/// Returns true for the event name a cron-style trigger reports
pub fn is_scheduled_event(event_name: Option<&str>) -> bool {
    event_name.is_some_and(|name| name.trim().eq_ignore_ascii_case("schedule"))
}

/// Choose the date to fetch.
///
/// An explicit override always wins. Scheduled runs and runs before
/// [`SAFE_HOUR_UTC`] take yesterday, everything else takes today.
pub fn select_summary_date(
    override_date: Option<&str>,
    is_scheduled_trigger: bool,
    now: DateTime<Utc>,
) -> Result<(NaiveDate, DateReason)> {
    if let Some(raw) = override_date.map(str::trim).filter(|s| !s.is_empty()) {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
            CodetallyError::Config(format!("invalid summary date '{}': {}", raw, e))
        })?;
        return Ok((date, DateReason::Override));
    }

    let today = now.date_naive();
    let yesterday = today - Duration::days(1);

    if is_scheduled_trigger {
        Ok((yesterday, DateReason::ScheduledTrigger))
    } else if now.hour() < SAFE_HOUR_UTC {
        Ok((yesterday, DateReason::EarlyHour))
    } else {
        Ok((today, DateReason::Today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 15, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_override_wins_over_everything() {
        let (d, reason) = select_summary_date(Some("2023-12-31"), true, at(2)).unwrap();
        assert_eq!(d, date(2023, 12, 31));
        assert_eq!(reason, DateReason::Override);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let (d, reason) = select_summary_date(Some("  "), false, at(12)).unwrap();
        assert_eq!(d, date(2024, 3, 10));
        assert_eq!(reason, DateReason::Today);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let err = select_summary_date(Some("10/03/2024"), false, at(12)).unwrap_err();
        assert!(matches!(err, CodetallyError::Config(_)));
    }

    #[test]
    fn test_scheduled_trigger_takes_yesterday() {
        let (d, reason) = select_summary_date(None, true, at(18)).unwrap();
        assert_eq!(d, date(2024, 3, 9));
        assert_eq!(reason, DateReason::ScheduledTrigger);
    }

    #[test]
    fn test_early_hour_takes_yesterday() {
        let (d, reason) = select_summary_date(None, false, at(5)).unwrap();
        assert_eq!(d, date(2024, 3, 9));
        assert_eq!(reason, DateReason::EarlyHour);
    }

    #[test]
    fn test_safe_hour_boundary_takes_today() {
        let (d, reason) = select_summary_date(None, false, at(6)).unwrap();
        assert_eq!(d, date(2024, 3, 10));
        assert_eq!(reason, DateReason::Today);
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let (d, _) = select_summary_date(None, false, now).unwrap();
        assert_eq!(d, date(2024, 2, 29));
    }

    #[test]
    fn test_is_scheduled_event() {
        assert!(is_scheduled_event(Some("schedule")));
        assert!(!is_scheduled_event(Some("push")));
        assert!(!is_scheduled_event(Some("workflow_dispatch")));
        assert!(!is_scheduled_event(None));
    }
}
