pub mod classify;
pub mod dates;
pub mod dedupe;
pub mod domain;
pub mod message;

pub use classify::ReminderClassifier;
pub use dedupe::{dedupe, DedupeOutcome};
pub use domain::{NaturalKey, PolicyRecord};
