pub mod config;
pub mod error;
pub mod import;
pub mod notify;
pub mod reminders;
pub mod store;
pub mod telemetry;
