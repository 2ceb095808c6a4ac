mod mapping;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::reminders::dates;
use crate::reminders::domain::PolicyRecord;
use mapping::Column;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read policy sheet: {}", err),
            ImportError::Csv(err) => write!(f, "invalid policy sheet data: {}", err),
            ImportError::MissingColumn(name) => {
                write!(f, "policy sheet is missing the required '{}' column", name)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Result of ingesting one policy sheet.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Candidate records in sheet order; duplicates are NOT collapsed here.
    pub records: Vec<PolicyRecord>,
    /// Rows dropped for lacking both an owner name and a parsable due day.
    pub invalid_rows: usize,
}

/// Reads the agency policy sheet (CSV export) into candidate records.
///
/// Headers may carry the Bulgarian source labels or the canonical English
/// names; they are translated positionally before rows are read.
#[derive(Debug, Clone)]
pub struct SpreadsheetImporter {
    date_format: String,
}

impl SpreadsheetImporter {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<ImportOutcome, ImportError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<ImportOutcome, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = translate_headers(csv_reader.headers()?)?;
        csv_reader.set_headers(headers);

        let mut records = Vec::new();
        let mut invalid_rows = 0;

        for row in csv_reader.deserialize::<SheetRow>() {
            let row = row?;

            let full_name = row.full_name.clone().unwrap_or_default();
            let due_day = self.parse_date_cell(&row.due_day);

            if full_name.is_empty() && due_day.is_none() {
                warn!("skipping sheet row with neither owner name nor due day");
                invalid_rows += 1;
                continue;
            }

            records.push(PolicyRecord {
                id: None,
                nickname: row.nickname.unwrap_or_default(),
                full_name,
                cell_phone: row.cell_phone.unwrap_or_default(),
                car_type: row.car_type.unwrap_or_default(),
                license_plate: row.license_plate.unwrap_or_default(),
                due_month: self.parse_date_cell(&row.due_month),
                notice: self.parse_date_cell(&row.notice),
                due_day,
                made_on: self.parse_date_cell(&row.made_on),
                amount: parse_count(row.amount.as_deref().unwrap_or("")),
                installments: parse_count(row.installments.as_deref().unwrap_or("")),
                policy_number: row.policy_number.unwrap_or_default(),
            });
        }

        info!(
            records = records.len(),
            invalid_rows, "policy sheet ingested"
        );

        Ok(ImportOutcome {
            records,
            invalid_rows,
        })
    }

    fn parse_date_cell(&self, cell: &Option<String>) -> Option<chrono::NaiveDate> {
        cell.as_deref()
            .and_then(|raw| dates::parse_date(raw, &self.date_format))
    }
}

/// One sheet row keyed by the canonical column names; cells left blank by
/// the export decode to `None`.
#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    cell_phone: Option<String>,
    #[serde(default)]
    car_type: Option<String>,
    #[serde(default)]
    license_plate: Option<String>,
    #[serde(default)]
    due_month: Option<String>,
    #[serde(default)]
    notice: Option<String>,
    #[serde(default)]
    due_day: Option<String>,
    #[serde(default)]
    made_on: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    installments: Option<String>,
    #[serde(default)]
    policy_number: Option<String>,
}

/// Rewrite sheet headers to the canonical column names so rows decode
/// straight into [`SheetRow`]. The first matching header wins if a sheet
/// repeats a label; later copies and unknown headers are renamed so the
/// decoder skips them.
fn translate_headers(headers: &csv::StringRecord) -> Result<csv::StringRecord, ImportError> {
    let mut translated = csv::StringRecord::new();
    let mut used: HashSet<Column> = HashSet::new();

    for header in headers {
        let normalized = mapping::normalize_header(header);
        match mapping::column_for_header(&normalized) {
            Some(column) if used.insert(column) => {
                translated.push_field(column.canonical_name());
            }
            _ => translated.push_field("__ignored"),
        }
    }

    for required in [Column::FullName, Column::DueDay] {
        if !used.contains(&required) {
            return Err(ImportError::MissingColumn(required.canonical_name()));
        }
    }

    Ok(translated)
}

/// Lenient non-negative count: blank, unparseable, or negative input is 0.
fn parse_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    if let Ok(value) = trimmed.parse::<u32>() {
        return value;
    }

    // Spreadsheet exports often serialize integer cells as "120.0".
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const FORMAT: &str = "%d.%m.%Y";

    fn importer() -> SpreadsheetImporter {
        SpreadsheetImporter::new(FORMAT)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
    }

    #[test]
    fn imports_rows_with_bulgarian_headers() {
        let sheet = "контрагент,име на собственик,телефон,авт-ил, Рег №,падеж,предупреди на,сума,вн,№ на полица\n\
                     ani,Ана Иванова,0888123456,Opel Corsa,CA1234BM,10.06.2024,08.06.2024,120,2,P1\n";

        let outcome = importer()
            .from_reader(Cursor::new(sheet))
            .expect("sheet imports");

        assert_eq!(outcome.invalid_rows, 0);
        assert_eq!(outcome.records.len(), 1);

        let record = &outcome.records[0];
        assert_eq!(record.full_name, "Ана Иванова");
        assert_eq!(record.license_plate, "CA1234BM");
        assert_eq!(record.due_day, Some(date(10)));
        assert_eq!(record.notice, Some(date(8)));
        assert_eq!(record.amount, 120);
        assert_eq!(record.installments, 2);
        assert_eq!(record.policy_number, "P1");
        assert_eq!(record.id, None);
    }

    #[test]
    fn imports_rows_with_canonical_headers() {
        let sheet = "full_name,due_day,amount\nAna,10.06.2024,150.0\n";

        let outcome = importer()
            .from_reader(Cursor::new(sheet))
            .expect("sheet imports");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].amount, 150);
        assert_eq!(outcome.records[0].due_day, Some(date(10)));
    }

    #[test]
    fn drops_rows_without_name_or_due_day() {
        let sheet = "full_name,due_day\n,\n,not-a-date\nAna,\n,10.06.2024\n";

        let outcome = importer()
            .from_reader(Cursor::new(sheet))
            .expect("sheet imports");

        // Rows keeping either field survive; fully blank ones are dropped.
        assert_eq!(outcome.invalid_rows, 2);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].full_name, "Ana");
        assert_eq!(outcome.records[0].due_day, None);
        assert_eq!(outcome.records[1].due_day, Some(date(10)));
    }

    #[test]
    fn repeated_header_labels_keep_the_first_occurrence() {
        let sheet = "full_name,due_day,full_name\nAna,10.06.2024,Other\n";

        let outcome = importer()
            .from_reader(Cursor::new(sheet))
            .expect("sheet imports");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].full_name, "Ana");
    }

    #[test]
    fn missing_required_column_fails_the_import() {
        let sheet = "full_name,notice\nAna,08.06.2024\n";

        let err = importer()
            .from_reader(Cursor::new(sheet))
            .expect_err("due_day column is required");

        assert!(matches!(err, ImportError::MissingColumn("due_day")));
    }

    #[test]
    fn numeric_fields_normalize_to_zero() {
        let sheet = "full_name,due_day,amount,installments\nAna,10.06.2024,abc,-3\n";

        let outcome = importer()
            .from_reader(Cursor::new(sheet))
            .expect("sheet imports");

        assert_eq!(outcome.records[0].amount, 0);
        assert_eq!(outcome.records[0].installments, 0);
    }
}
