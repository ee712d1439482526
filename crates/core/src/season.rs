//! Season form parsing: raw dialog strings into a normalized window.

use chrono::NaiveDate;

/// Shown on the goal field when it is not a positive integer.
pub const GOAL_FIELD_ERROR: &str = "Enter a positive number";
/// Shown on a date field that does not parse.
pub const DATE_FIELD_ERROR: &str = "Use YYYY-MM-DD";
/// Shown on the end field when the window is inverted.
pub const RANGE_FIELD_ERROR: &str = "End must be after Start";

/// Raw strings as submitted in the configuration or reset dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeasonForm {
    pub start: String,
    pub end: String,
    pub goal: String,
}

/// A validated season: goal plus the start/end window as unix seconds
/// (UTC midnight of the submitted calendar dates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeasonWindow {
    pub goal: i64,
    pub start: i64,
    pub end: i64,
}

/// Per-field failures from one parse pass. All fields are checked before
/// reporting; a caller keyed on dialog blocks maps each slot to its block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeasonFieldErrors {
    pub start: Option<&'static str>,
    pub end: Option<&'static str>,
    pub goal: Option<&'static str>,
}

impl SeasonFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.goal.is_none()
    }
}

impl SeasonForm {
    pub fn parse(&self) -> Result<SeasonWindow, SeasonFieldErrors> {
        let mut errors = SeasonFieldErrors::default();

        let goal = match self.goal.trim().parse::<i64>() {
            Ok(goal) if goal >= 1 => Some(goal),
            _ => {
                errors.goal = Some(GOAL_FIELD_ERROR);
                None
            }
        };

        let start = parse_date(&self.start);
        if start.is_none() {
            errors.start = Some(DATE_FIELD_ERROR);
        }

        let end = parse_date(&self.end);
        match (start, end) {
            (_, None) => errors.end = Some(DATE_FIELD_ERROR),
            (Some(start), Some(end)) if end < start => errors.end = Some(RANGE_FIELD_ERROR),
            _ => {}
        }

        match (goal, start, end) {
            (Some(goal), Some(start), Some(end)) if errors.is_empty() => {
                Ok(SeasonWindow { goal, start, end })
            }
            _ => Err(errors),
        }
    }
}

fn parse_date(value: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::{
        SeasonForm, SeasonWindow, DATE_FIELD_ERROR, GOAL_FIELD_ERROR, RANGE_FIELD_ERROR,
    };

    fn form(start: &str, end: &str, goal: &str) -> SeasonForm {
        SeasonForm { start: start.to_string(), end: end.to_string(), goal: goal.to_string() }
    }

    #[test]
    fn parses_a_valid_window_to_utc_midnight_seconds() {
        let window = form("2025-09-16", "2025-12-01", "100").parse().expect("valid form");

        assert_eq!(
            window,
            SeasonWindow { goal: 100, start: 1_757_980_800, end: 1_764_547_200 }
        );
    }

    #[test]
    fn accepts_a_single_day_season() {
        let window = form("2025-09-16", "2025-09-16", "5").parse().expect("same-day window");

        assert_eq!(window.start, window.end);
    }

    #[test]
    fn rejects_an_inverted_window_on_the_end_field() {
        let errors = form("2025-09-16", "2025-09-01", "100").parse().unwrap_err();

        assert_eq!(errors.end, Some(RANGE_FIELD_ERROR));
        assert_eq!(errors.start, None);
        assert_eq!(errors.goal, None);
    }

    #[test]
    fn rejects_non_positive_and_non_numeric_goals() {
        for goal in ["0", "abc", "-5", "10.5", ""] {
            let errors = form("2025-09-16", "2025-12-01", goal).parse().unwrap_err();
            assert_eq!(errors.goal, Some(GOAL_FIELD_ERROR), "goal `{goal}`");
        }
    }

    #[test]
    fn rejects_unparseable_dates_per_field() {
        let errors = form("09/16/2025", "2025-13-01", "100").parse().unwrap_err();

        assert_eq!(errors.start, Some(DATE_FIELD_ERROR));
        assert_eq!(errors.end, Some(DATE_FIELD_ERROR));
    }

    #[test]
    fn collects_all_field_errors_in_one_pass() {
        let errors = form("", "", "zero").parse().unwrap_err();

        assert_eq!(errors.start, Some(DATE_FIELD_ERROR));
        assert_eq!(errors.end, Some(DATE_FIELD_ERROR));
        assert_eq!(errors.goal, Some(GOAL_FIELD_ERROR));
    }

    #[test]
    fn range_check_is_skipped_when_a_date_is_unparseable() {
        let errors = form("2025-09-16", "bogus", "100").parse().unwrap_err();

        assert_eq!(errors.end, Some(DATE_FIELD_ERROR));
    }
}
