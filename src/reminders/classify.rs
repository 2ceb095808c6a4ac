use std::cmp::Ordering;

use chrono::NaiveDate;

use super::dates;
use super::dedupe;
use super::domain::PolicyRecord;

/// Read-only classification over an in-memory record set.
///
/// The reference date is always injected by the caller, never read from the
/// ambient clock, so a fixed input always classifies identically.
#[derive(Debug, Clone, Copy)]
pub struct ReminderClassifier {
    reference_date: NaiveDate,
    notice_window_days: u32,
}

impl ReminderClassifier {
    pub fn new(reference_date: NaiveDate, notice_window_days: u32) -> Self {
        Self {
            reference_date,
            notice_window_days,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Records whose notice window covers the reference date, plus every
    /// record already past its due day. Sorted by due day, name tie-break.
    pub fn due_soon(&self, records: &[PolicyRecord]) -> Vec<PolicyRecord> {
        let mut matched: Vec<PolicyRecord> = records
            .iter()
            .filter(|record| {
                let notice_active = record.notice.is_some_and(|notice| {
                    dates::is_within_days(
                        Some(self.reference_date),
                        notice,
                        self.notice_window_days,
                    )
                });
                notice_active || dates::is_past(record.due_day, self.reference_date)
            })
            .cloned()
            .collect();

        sort_by_due_day(&mut matched);
        matched
    }

    /// Records whose due day lies strictly before the reference date.
    pub fn overdue(&self, records: &[PolicyRecord]) -> Vec<PolicyRecord> {
        let mut matched: Vec<PolicyRecord> = records
            .iter()
            .filter(|record| dates::is_past(record.due_day, self.reference_date))
            .cloned()
            .collect();

        sort_by_due_day(&mut matched);
        matched
    }

    /// The trigger set for outbound notification: records whose notice date
    /// or due day equals the reference date.
    ///
    /// Evaluated against deduplicated input so a policy appearing in several
    /// source rows is reminded at most once per run.
    pub fn eligible_today(&self, records: &[PolicyRecord]) -> Vec<PolicyRecord> {
        dedupe::dedupe(records)
            .unique
            .into_iter()
            .filter(|record| {
                record.notice == Some(self.reference_date)
                    || record.due_day == Some(self.reference_date)
            })
            .collect()
    }
}

/// Strict total order: ascending due day with absent days sorted last,
/// ties broken by full name. Due days collide often enough that the
/// tie-break is needed for deterministic output.
fn sort_by_due_day(records: &mut [PolicyRecord]) {
    records.sort_by(compare_by_due_day);
}

fn compare_by_due_day(a: &PolicyRecord, b: &PolicyRecord) -> Ordering {
    match (a.due_day, b.due_day) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.full_name.cmp(&b.full_name))
}
