use std::env;
use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;

/// Distinguishes runtime behavior for different stages of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the reminder workflow.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub import: ImportConfig,
    pub notification: NotificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let date_format =
            env::var("REMINDER_DATE_FORMAT").unwrap_or_else(|_| "%d.%m.%Y".to_string());
        validate_date_format(&date_format)?;

        let default_source = env::var("REMINDER_SOURCE").ok().map(PathBuf::from);

        let days_ahead = env::var("REMINDER_DAYS_AHEAD")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidDaysAhead)?;

        let country_code =
            env::var("REMINDER_COUNTRY_CODE").unwrap_or_else(|_| "+359".to_string());

        let test_phone = env::var("REMINDER_TEST_PHONE")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            import: ImportConfig {
                date_format,
                default_source,
            },
            notification: NotificationConfig {
                days_ahead,
                country_code,
                test_phone,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Spreadsheet ingestion settings.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// chrono format string for date cells in the source sheet.
    pub date_format: String,
    /// Sheet consumed when the CLI omits `--source`.
    pub default_source: Option<PathBuf>,
}

/// Reminder dispatch settings.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Notice window length in days.
    pub days_ahead: u32,
    /// Country code substituted for a leading zero in local numbers.
    pub country_code: String,
    /// Test-mode target; all reminders route here unless production
    /// delivery is selected (`--prod` or `APP_ENV=production`).
    pub test_phone: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidDaysAhead,
    InvalidDateFormat { value: String },
    MissingSource,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDaysAhead => {
                write!(f, "REMINDER_DAYS_AHEAD must be a non-negative integer")
            }
            ConfigError::InvalidDateFormat { value } => {
                write!(f, "REMINDER_DATE_FORMAT '{}' is not a usable chrono date format", value)
            }
            ConfigError::MissingSource => write!(
                f,
                "no policy sheet given: pass --source or set REMINDER_SOURCE"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn validate_date_format(format: &str) -> Result<(), ConfigError> {
    if format.trim().is_empty() {
        return Err(ConfigError::InvalidDateFormat {
            value: format.to_string(),
        });
    }

    // Formatting a probe date surfaces unknown specifiers at startup
    // instead of on the first imported row.
    let probe = NaiveDate::from_ymd_opt(2000, 1, 1).expect("probe date is valid");
    let mut rendered = String::new();
    if write!(rendered, "{}", probe.format(format)).is_err() {
        return Err(ConfigError::InvalidDateFormat {
            value: format.to_string(),
        });
    }

    Ok(())
}
