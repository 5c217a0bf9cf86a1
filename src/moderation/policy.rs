//! Numeric bounds for timeouts and ban history-deletion windows.
//!
//! Both checks run before any notification or platform call; a failure here
//! short-circuits the whole workflow with no side effects.

use super::duration::parse_duration_ms;
use super::ModerationError;

/// Discord refuses timeouts shorter than 30 seconds.
pub const TIMEOUT_MIN_MS: u64 = 30 * 1_000;
/// ... or longer than 28 days.
pub const TIMEOUT_MAX_MS: u64 = 28 * 24 * 60 * 60 * 1_000;

/// The history windows offered in the slash choices and the ban modal.
pub const HISTORY_WINDOW_HOURS: [u32; 7] = [0, 1, 6, 12, 24, 72, 168];
/// Upper bound of the deletion window in seconds (7 days).
pub const HISTORY_WINDOW_MAX_SECS: u32 = 7 * 24 * 60 * 60;

/// Parses and bound-checks a raw timeout duration, returning milliseconds.
pub fn validate_timeout_duration(raw: &str) -> Result<u64, ModerationError> {
    let ms = parse_duration_ms(raw).ok_or(ModerationError::InvalidDuration)?;

    if !(TIMEOUT_MIN_MS..=TIMEOUT_MAX_MS).contains(&ms) {
        return Err(ModerationError::DurationOutOfBounds);
    }

    Ok(ms)
}

/// Converts a ban history window in whole hours to the seconds of message
/// history to delete. The window must come from [`HISTORY_WINDOW_HOURS`];
/// an absent value is rejected, not defaulted.
pub fn validate_history_window(hours: Option<u32>) -> Result<u32, ModerationError> {
    let hours = hours.ok_or(ModerationError::InvalidHistoryWindow)?;

    if !HISTORY_WINDOW_HOURS.contains(&hours) {
        return Err(ModerationError::InvalidHistoryWindow);
    }

    let seconds = hours * 3_600;
    if seconds > HISTORY_WINDOW_MAX_SECS {
        return Err(ModerationError::InvalidHistoryWindow);
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_durations_within_bounds() {
        assert_eq!(validate_timeout_duration("30m").unwrap(), 1_800_000);
        assert_eq!(validate_timeout_duration("30s").unwrap(), TIMEOUT_MIN_MS);
        assert_eq!(validate_timeout_duration("28d").unwrap(), TIMEOUT_MAX_MS);
    }

    #[test]
    fn rejects_out_of_bounds_durations() {
        assert!(matches!(
            validate_timeout_duration("29s"),
            Err(ModerationError::DurationOutOfBounds)
        ));
        assert!(matches!(
            validate_timeout_duration("29d"),
            Err(ModerationError::DurationOutOfBounds)
        ));
    }

    #[test]
    fn rejects_unparseable_durations() {
        assert!(matches!(
            validate_timeout_duration("soon"),
            Err(ModerationError::InvalidDuration)
        ));
        assert!(matches!(
            validate_timeout_duration(""),
            Err(ModerationError::InvalidDuration)
        ));
    }

    #[test]
    fn converts_history_window_to_seconds() {
        assert_eq!(validate_history_window(Some(0)).unwrap(), 0);
        assert_eq!(validate_history_window(Some(6)).unwrap(), 21_600);
        assert_eq!(validate_history_window(Some(168)).unwrap(), 604_800);
    }

    #[test]
    fn rejects_windows_outside_the_enumerated_set() {
        assert!(validate_history_window(Some(5)).is_err());
        assert!(validate_history_window(Some(169)).is_err());
        assert!(validate_history_window(None).is_err());
    }
}
