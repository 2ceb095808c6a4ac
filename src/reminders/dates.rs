use chrono::{Duration, NaiveDate};

/// True iff `date` falls inside `[reference, reference + days]`.
///
/// Total over optional dates: an absent date never matches a window, and a
/// window whose end would overflow the calendar is treated as unbounded
/// above (any date on or after the reference qualifies).
pub fn is_within_days(date: Option<NaiveDate>, reference: NaiveDate, days: u32) -> bool {
    let Some(d) = date else {
        return false;
    };

    if d < reference {
        return false;
    }

    match reference.checked_add_signed(Duration::days(i64::from(days))) {
        Some(end) => d <= end,
        None => true,
    }
}

/// True iff `date` is strictly before `reference`. Absent dates are never past.
pub fn is_past(date: Option<NaiveDate>, reference: NaiveDate) -> bool {
    match date {
        Some(d) => d < reference,
        None => false,
    }
}

/// Signed day count `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Parse a calendar date using the configured spreadsheet format.
/// Unparseable or blank input yields `None`.
pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
        return Some(date);
    }

    // Spreadsheet exports sometimes serialize date cells in ISO form.
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Format an optional date with the configured format; `None` renders empty.
pub fn format_date(date: Option<NaiveDate>, format: &str) -> String {
    match date {
        Some(d) => d.format(format).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%d.%m.%Y";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let reference = date(2024, 6, 10);
        assert!(is_within_days(Some(date(2024, 6, 10)), reference, 5));
        assert!(is_within_days(Some(date(2024, 6, 15)), reference, 5));
        assert!(!is_within_days(Some(date(2024, 6, 16)), reference, 5));
        assert!(!is_within_days(Some(date(2024, 6, 9)), reference, 5));
    }

    #[test]
    fn zero_day_window_matches_only_the_reference() {
        let reference = date(2024, 6, 10);
        assert!(is_within_days(Some(reference), reference, 0));
        assert!(!is_within_days(Some(date(2024, 6, 11)), reference, 0));
    }

    #[test]
    fn oversized_window_saturates_instead_of_panicking() {
        let reference = date(2024, 6, 10);
        assert!(is_within_days(Some(reference), reference, u32::MAX));
        assert!(is_within_days(Some(NaiveDate::MAX), reference, u32::MAX));
        assert!(!is_within_days(Some(date(2024, 6, 9)), reference, u32::MAX));
        assert!(!is_within_days(None, reference, u32::MAX));
    }

    #[test]
    fn absent_dates_never_match_predicates() {
        let reference = date(2024, 6, 10);
        assert!(!is_within_days(None, reference, 30));
        assert!(!is_past(None, reference));
    }

    #[test]
    fn is_past_is_strict() {
        let reference = date(2024, 6, 10);
        assert!(is_past(Some(date(2024, 6, 9)), reference));
        assert!(!is_past(Some(reference), reference));
        assert!(!is_past(Some(date(2024, 6, 11)), reference));
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(date(2024, 6, 10), date(2024, 6, 15)), 5);
        assert_eq!(days_between(date(2024, 6, 15), date(2024, 6, 10)), -5);
        assert_eq!(days_between(date(2024, 6, 10), date(2024, 6, 10)), 0);
    }

    #[test]
    fn parses_configured_and_iso_formats() {
        assert_eq!(parse_date("10.06.2024", FORMAT), Some(date(2024, 6, 10)));
        assert_eq!(parse_date(" 2024-06-10 ", FORMAT), Some(date(2024, 6, 10)));
        assert_eq!(parse_date("", FORMAT), None);
        assert_eq!(parse_date("not-a-date", FORMAT), None);
    }

    #[test]
    fn formats_absent_date_as_empty() {
        assert_eq!(format_date(Some(date(2024, 6, 10)), FORMAT), "10.06.2024");
        assert_eq!(format_date(None, FORMAT), "");
    }
}
