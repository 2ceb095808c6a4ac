use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::reminders::classify::ReminderClassifier;
use crate::reminders::domain::PolicyRecord;
use crate::reminders::message;

/// Outbound delivery boundary (SMS or chat-app text).
///
/// Channel selection, authentication, and transport retries live behind
/// this trait; the dispatcher only hands over an address and a body.
pub trait MessageGateway: Send + Sync {
    /// Deliver one message, returning the gateway's message id.
    fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("message rejected by gateway: {0}")]
    Rejected(String),
    #[error("gateway transport unavailable: {0}")]
    Transport(String),
}

/// Test-mode gateway: logs the message instead of delivering it and hands
/// back a synthetic id.
#[derive(Debug, Default)]
pub struct ConsoleGateway {
    counter: AtomicU64,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageGateway for ConsoleGateway {
    fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!(%to, %body, "TEST MODE: message not delivered");
        Ok(format!("console-{id}"))
    }
}

/// Per-run accounting for reminder dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Records eligible for a reminder on the reference date.
    pub eligible: usize,
    /// Messages the gateway accepted.
    pub sent: usize,
    /// Eligible records skipped over an unusable number or a failed send.
    pub skipped: usize,
}

/// Walks the eligible-today set and pushes reminders through the gateway.
///
/// Every failure is isolated per record: a bad phone number or a rejected
/// send is logged and skipped, never aborting the rest of the batch.
pub struct ReminderDispatcher<'a> {
    gateway: &'a dyn MessageGateway,
    classifier: ReminderClassifier,
    date_format: String,
    country_code: String,
    /// When set, every message is routed here instead of the record's
    /// number (test mode).
    test_phone: Option<String>,
}

impl<'a> ReminderDispatcher<'a> {
    pub fn new(
        gateway: &'a dyn MessageGateway,
        classifier: ReminderClassifier,
        date_format: impl Into<String>,
        country_code: impl Into<String>,
        test_phone: Option<String>,
    ) -> Self {
        Self {
            gateway,
            classifier,
            date_format: date_format.into(),
            country_code: country_code.into(),
            test_phone,
        }
    }

    pub fn dispatch(&self, records: &[PolicyRecord]) -> DispatchOutcome {
        let eligible = self.classifier.eligible_today(records);
        let mut outcome = DispatchOutcome {
            eligible: eligible.len(),
            ..DispatchOutcome::default()
        };

        for record in &eligible {
            let Some(body) =
                message::build_message(record, self.classifier.reference_date(), &self.date_format)
            else {
                continue;
            };

            let raw_target = self
                .test_phone
                .as_deref()
                .unwrap_or(record.cell_phone.as_str());
            let target = message::normalize_phone(raw_target, &self.country_code);

            if target.is_empty() || target.len() < 10 {
                warn!(
                    full_name = %record.full_name,
                    raw = %raw_target,
                    "unusable phone number, reminder skipped"
                );
                outcome.skipped += 1;
                continue;
            }

            match self.gateway.send(&target, &body) {
                Ok(message_id) => {
                    info!(
                        full_name = %record.full_name,
                        due_day = ?record.due_day,
                        %message_id,
                        "reminder sent"
                    );
                    outcome.sent += 1;
                }
                Err(err) => {
                    warn!(
                        full_name = %record.full_name,
                        error = %err,
                        "reminder delivery failed, continuing with the batch"
                    );
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::domain::testing::record;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    const FORMAT: &str = "%d.%m.%Y";

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
    }

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl MessageGateway for RecordingGateway {
        fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Transport("wire down".to_string()));
            }
            let mut sent = self.sent.lock().expect("gateway mutex poisoned");
            sent.push((to.to_string(), body.to_string()));
            Ok(format!("msg-{}", sent.len()))
        }
    }

    fn dispatcher<'a>(
        gateway: &'a RecordingGateway,
        test_phone: Option<String>,
    ) -> ReminderDispatcher<'a> {
        ReminderDispatcher::new(
            gateway,
            ReminderClassifier::new(date(10), 5),
            FORMAT,
            "+359",
            test_phone,
        )
    }

    #[test]
    fn sends_one_reminder_per_eligible_record() {
        let gateway = RecordingGateway::default();
        let rows = vec![
            record("Ana", Some(date(10))),
            record("Ana", Some(date(10))),
            record("Boris", Some(date(20))),
        ];

        let outcome = dispatcher(&gateway, None).dispatch(&rows);

        assert_eq!(outcome.eligible, 1, "duplicates collapse before dispatch");
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.skipped, 0);

        let sent = gateway.sent.lock().expect("gateway mutex poisoned");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+359888123456");
        assert!(sent[0].1.contains("due TODAY"));
    }

    #[test]
    fn test_phone_overrides_record_numbers() {
        let gateway = RecordingGateway::default();
        let rows = vec![record("Ana", Some(date(10)))];

        let outcome = dispatcher(&gateway, Some("0899000111".to_string())).dispatch(&rows);

        assert_eq!(outcome.sent, 1);
        let sent = gateway.sent.lock().expect("gateway mutex poisoned");
        assert_eq!(sent[0].0, "+359899000111");
    }

    #[test]
    fn unusable_numbers_are_skipped_without_aborting() {
        let gateway = RecordingGateway::default();
        let mut no_phone = record("Ana", Some(date(10)));
        no_phone.cell_phone = "*".to_string();
        let mut short = record("Boris", Some(date(10)));
        short.cell_phone = "0888".to_string();
        let rows = vec![no_phone, short, record("Vera", Some(date(10)))];

        let outcome = dispatcher(&gateway, None).dispatch(&rows);

        assert_eq!(outcome.eligible, 3);
        assert_eq!(outcome.sent, 1);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn delivery_failures_never_abort_the_batch() {
        let gateway = RecordingGateway {
            fail: true,
            ..RecordingGateway::default()
        };
        let rows = vec![
            record("Ana", Some(date(10))),
            record("Boris", Some(date(10))),
        ];

        let outcome = dispatcher(&gateway, None).dispatch(&rows);

        assert_eq!(outcome.eligible, 2);
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn console_gateway_returns_synthetic_ids() {
        let gateway = ConsoleGateway::new();
        let first = gateway.send("+359888123456", "hello").expect("accepted");
        let second = gateway.send("+359888123456", "hello").expect("accepted");
        assert_eq!(first, "console-1");
        assert_eq!(second, "console-2");
    }
}
