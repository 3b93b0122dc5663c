//! Day-first date parsing for spreadsheet cells.
//!
//! Cells come back from the backends as strings in whatever shape the
//! operators typed. Parsing is day-first (d/m/Y) and never fails the batch:
//! an unreadable cell is the same as an empty one.

use chrono::NaiveDate;

/// Accepted cell formats, tried in order
const FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%Y-%m-%d"];

/// Parse a date cell, day-first. Returns `None` for empty or unparseable
/// input; a trailing time component (exported datetime cells) is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Drop a time suffix like "15/05/2025 00:00:00"
    let date_part = trimmed.split_whitespace().next()?;
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_first_slash() {
        assert_eq!(
            parse_day_first("15/05/2025"),
            Some(NaiveDate::from_ymd_opt(2025, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_day_first_not_month_first() {
        // 03/04 is the 3rd of April, not March 4th
        assert_eq!(
            parse_day_first("03/04/2025"),
            Some(NaiveDate::from_ymd_opt(2025, 4, 3).unwrap())
        );
    }

    #[test]
    fn test_dash_and_iso() {
        assert_eq!(
            parse_day_first("01-03-2025"),
            Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert_eq!(
            parse_day_first("2025-03-01"),
            Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_time_suffix_ignored() {
        assert_eq!(
            parse_day_first("15/05/2025 00:00:00"),
            Some(NaiveDate::from_ymd_opt(2025, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_garbage_is_none_not_error() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("   "), None);
        assert_eq!(parse_day_first("sin fecha"), None);
        assert_eq!(parse_day_first("99/99/2025"), None);
    }
}
