use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;

use insurance_reminder::config::{AppConfig, AppEnvironment, ConfigError};
use insurance_reminder::error::AppError;
use insurance_reminder::import::SpreadsheetImporter;
use insurance_reminder::notify::{ConsoleGateway, ReminderDispatcher};
use insurance_reminder::reminders::dates::format_date;
use insurance_reminder::reminders::{dedupe, PolicyRecord, ReminderClassifier};
use insurance_reminder::store::{InMemoryPolicyStore, PolicyStore};
use insurance_reminder::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Insurance Reminder",
    about = "Import insurance policy records and dispatch due-date reminders",
    version
)]
struct Cli {
    /// Path to the policy sheet (CSV export); falls back to REMINDER_SOURCE
    #[arg(long)]
    source: Option<PathBuf>,
    /// Check upcoming policies and send reminder messages
    #[arg(long)]
    notify: bool,
    /// Production mode: deliver to real numbers instead of the test phone
    #[arg(long)]
    prod: bool,
    /// Notice window length in days (overrides REMINDER_DAYS_AHEAD)
    #[arg(long)]
    days: Option<u32>,
    /// Reference date for classification (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(?config.environment, "reminder workflow starting");

    let source = cli
        .source
        .clone()
        .or_else(|| config.import.default_source.clone())
        .ok_or(ConfigError::MissingSource)?;

    let importer = SpreadsheetImporter::new(config.import.date_format.clone());
    let imported = importer.from_path(&source)?;
    let screened = dedupe(&imported.records);
    info!(
        unique = screened.unique.len(),
        suppressed = screened.suppressed,
        invalid_rows = imported.invalid_rows,
        source = %source.display(),
        "policy sheet screened"
    );

    let store = InMemoryPolicyStore::new();
    let mut inserted = 0;
    let mut already_stored = 0;
    for record in &screened.unique {
        if store.insert_if_absent(record.clone())? {
            inserted += 1;
        } else {
            already_stored += 1;
        }
    }
    info!(inserted, already_stored, "records persisted");

    let reference_date = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let window_days = cli.days.unwrap_or(config.notification.days_ahead);
    let classifier = ReminderClassifier::new(reference_date, window_days);

    let stored = store.all()?;
    render_listings(&classifier, &stored, &config.import.date_format);

    if cli.notify {
        let test_mode = is_test_mode(cli.prod, config.environment);
        render_mode_banner(test_mode);

        // A vendor SMS/chat client plugs in here through MessageGateway.
        let gateway = ConsoleGateway::new();
        let test_phone = if test_mode {
            config.notification.test_phone.clone()
        } else {
            None
        };
        let dispatcher = ReminderDispatcher::new(
            &gateway,
            classifier,
            config.import.date_format.clone(),
            config.notification.country_code.clone(),
            test_phone,
        );

        let outcome = dispatcher.dispatch(&stored);
        println!(
            "\nReminders: {} eligible, {} sent, {} skipped",
            outcome.eligible, outcome.sent, outcome.skipped
        );
    }

    Ok(())
}

/// Reminders go to real numbers only when asked for explicitly, either per
/// run (`--prod`) or by deploying with `APP_ENV=production`.
fn is_test_mode(prod_flag: bool, environment: AppEnvironment) -> bool {
    !prod_flag && environment != AppEnvironment::Production
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn render_listings(
    classifier: &ReminderClassifier,
    records: &[PolicyRecord],
    date_format: &str,
) {
    let due_soon = classifier.due_soon(records);
    println!("\nPolicies due soon ({}):", due_soon.len());
    for record in &due_soon {
        println!(
            "- {} | due {} | notice {}",
            record.full_name,
            format_date(record.due_day, date_format),
            format_date(record.notice, date_format)
        );
    }

    let overdue = classifier.overdue(records);
    println!("\nOverdue policies ({}):", overdue.len());
    for record in &overdue {
        println!(
            "- {} | due {} | {} ({})",
            record.full_name,
            format_date(record.due_day, date_format),
            record.car_type,
            record.license_plate
        );
    }
}

fn render_mode_banner(test_mode: bool) {
    let mode = if test_mode { "TEST MODE" } else { "PRODUCTION MODE" };
    println!("\n{}", "=".repeat(50));
    println!("CHECKING UPCOMING POLICIES AND SENDING REMINDERS ({mode})");
    println!("{}", "=".repeat(50));
}
