use chrono::NaiveDate;

use super::dates;
use super::domain::PolicyRecord;

/// Decide whether a record warrants a reminder on the reference date and
/// render the text if so.
///
/// The notice date takes priority over the due day. A record that is merely
/// inside its notice window (but whose notice date is not today) yields no
/// message: it may appear in the due-soon listing without being actionable.
pub fn build_message(
    record: &PolicyRecord,
    reference_date: NaiveDate,
    date_format: &str,
) -> Option<String> {
    if record.notice == Some(reference_date) {
        return Some(format!(
            "Hello {}, this is a reminder that your insurance for {} ({}) will be due on {}.",
            record.full_name,
            record.car_type,
            record.license_plate,
            dates::format_date(record.due_day, date_format),
        ));
    }

    if record.due_day == Some(reference_date) {
        return Some(format!(
            "Hello {}, your insurance for {} ({}) is due TODAY. \
             Please make your payment as soon as possible.",
            record.full_name, record.car_type, record.license_plate,
        ));
    }

    None
}

/// Normalize a phone number into international form for the gateway.
///
/// Strips everything except digits and `+`; a local-format number starting
/// with `0` has the leading zero replaced by `country_code`, any other bare
/// number gets a plain `+` prefix. Empty input stays empty.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.is_empty() || cleaned.starts_with('+') {
        return cleaned;
    }

    if let Some(rest) = cleaned.strip_prefix('0') {
        return format!("{country_code}{rest}");
    }

    format!("+{cleaned}")
}
