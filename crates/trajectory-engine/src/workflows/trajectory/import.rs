use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{NewSignal, SignalSentiment, SignalType};
use crate::workflows::directory::{CompanyId, EmployeeId};

#[derive(Debug)]
pub enum SignalImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for SignalImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalImportError::Io(err) => write!(f, "failed to read signal export: {}", err),
            SignalImportError::Csv(err) => write!(f, "invalid signal CSV data: {}", err),
            SignalImportError::InvalidRow { line, reason } => {
                write!(f, "invalid signal on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for SignalImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignalImportError::Io(err) => Some(err),
            SignalImportError::Csv(err) => Some(err),
            SignalImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for SignalImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SignalImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads signal exports with columns `employee_id, company_id, signal_type, signal_value,
/// captured_at` and optional `signal_weight, signal_sentiment, source_id, source_table`.
pub struct SignalCsvImporter;

impl SignalCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<NewSignal>, SignalImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<NewSignal>, SignalImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut signals = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or(0);
            let row: SignalRow = record.deserialize(Some(&headers))?;
            signals.push(row.into_signal(line)?);
        }

        Ok(signals)
    }
}

#[derive(Debug, Deserialize)]
struct SignalRow {
    employee_id: String,
    company_id: String,
    signal_type: SignalType,
    signal_value: f64,
    captured_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    signal_weight: Option<String>,
    #[serde(default)]
    signal_sentiment: Option<SignalSentiment>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source_table: Option<String>,
}

impl SignalRow {
    fn into_signal(self, line: u64) -> Result<NewSignal, SignalImportError> {
        let invalid = |reason: String| SignalImportError::InvalidRow { line, reason };

        if self.employee_id.is_empty() || self.company_id.is_empty() {
            return Err(invalid("employee_id and company_id are required".to_string()));
        }
        if !self.signal_value.is_finite() {
            return Err(invalid("signal_value must be finite".to_string()));
        }

        let captured_at = parse_timestamp(&self.captured_at)
            .ok_or_else(|| invalid(format!("unrecognized captured_at '{}'", self.captured_at)))?;

        let signal_weight = self
            .signal_weight
            .as_deref()
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|_| invalid(format!("unrecognized signal_weight '{raw}'")))
            })
            .transpose()?;

        Ok(NewSignal {
            employee_id: EmployeeId(self.employee_id),
            company_id: CompanyId(self.company_id),
            signal_type: self.signal_type,
            signal_value: self.signal_value,
            signal_sentiment: self.signal_sentiment,
            source_id: self.source_id,
            source_table: self.source_table,
            signal_weight,
            captured_at: Some(captured_at),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
