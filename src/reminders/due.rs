use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::ReminderError;

/// Used when a task has a due date but no due time.
pub const DEFAULT_DUE_TIME: &str = "23:59";

/// Combines a stored due date and time into a wall-clock timestamp.
///
/// Returns `Ok(None)` for a blank date. A blank or absent time falls back to
/// [`DEFAULT_DUE_TIME`]; any other time must be exactly `HH:MM`.
pub fn parse_due(
    due_date: Option<&str>,
    due_time: Option<&str>,
) -> Result<Option<NaiveDateTime>, ReminderError> {
    let due_date = due_date.map(str::trim).unwrap_or_default();
    if due_date.is_empty() {
        return Ok(None);
    }

    let due_time = match due_time.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_DUE_TIME,
    };

    let date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").map_err(|e| {
        ReminderError::ParseFailure {
            value: format!("{due_date} {due_time}"),
            reason: e.to_string(),
        }
    })?;

    // chrono accepts single-digit hours, the stored format does not
    if due_time.len() != 5 {
        return Err(ReminderError::ParseFailure {
            value: format!("{due_date} {due_time}"),
            reason: "due time is not HH:MM".to_string(),
        });
    }
    let time = NaiveTime::parse_from_str(due_time, "%H:%M").map_err(|e| {
        ReminderError::ParseFailure {
            value: format!("{due_date} {due_time}"),
            reason: e.to_string(),
        }
    })?;

    Ok(Some(NaiveDateTime::new(date, time)))
}

/// `true` when `due` lies in `[now, now + window]`. A window reaching past
/// the last representable timestamp has no upper bound.
pub fn is_due_soon(due: NaiveDateTime, now: NaiveDateTime, window: Duration) -> bool {
    due >= now && now.checked_add_signed(window).map_or(true, |end| due <= end)
}

pub fn format_due(due: NaiveDateTime) -> String {
    due.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_parse_due_with_time() {
        let due = parse_due(Some("2024-01-01"), Some("12:30")).unwrap();
        assert_eq!(due, Some(at("2024-01-01 12:30")));
    }

    #[test]
    fn test_missing_time_defaults_to_end_of_day() {
        assert_eq!(parse_due(Some("2024-01-01"), None).unwrap(), Some(at("2024-01-01 23:59")));
        assert_eq!(
            parse_due(Some(" 2024-01-01 "), Some("  ")).unwrap(),
            Some(at("2024-01-01 23:59"))
        );
    }

    #[test]
    fn test_blank_date_is_not_a_candidate() {
        assert_eq!(parse_due(Some("   "), Some("12:00")).unwrap(), None);
        assert_eq!(parse_due(None, None).unwrap(), None);
    }

    #[test]
    fn test_malformed_values_are_parse_failures() {
        for (date, time) in [
            ("2024-01-01", "9pm"),
            ("2024-01-01", "9:30"),
            ("2024-01-01", "25:00"),
            ("01/01/2024", "12:00"),
            ("2024-02-30", "12:00"),
        ] {
            let err = parse_due(Some(date), Some(time)).unwrap_err();
            assert!(matches!(err, ReminderError::ParseFailure { .. }), "{date} {time}");
        }
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let now = at("2024-01-01 12:00");
        let hour = Duration::hours(1);

        assert!(is_due_soon(at("2024-01-01 12:00"), now, hour));
        assert!(is_due_soon(at("2024-01-01 12:30"), now, hour));
        assert!(is_due_soon(at("2024-01-01 13:00"), now, hour));
        assert!(!is_due_soon(at("2024-01-01 13:01"), now, hour));
        assert!(!is_due_soon(at("2024-01-01 11:59"), now, hour));
        assert!(!is_due_soon(at("2024-01-01 14:00"), now, hour));
    }

    #[test]
    fn test_window_past_max_timestamp_does_not_overflow() {
        let now = at("2024-01-01 12:00");
        let window = Duration::try_days(100_000_000).unwrap();

        assert!(is_due_soon(at("9999-12-31 23:59"), now, window));
        assert!(!is_due_soon(at("2023-12-31 23:59"), now, window));
    }

    #[test]
    fn test_format_due() {
        assert_eq!(format_due(at("2024-03-05 07:09")), "2024-03-05 07:09");
    }
}
