//! Structured records for the workbook sheets.
//!
//! Rows are positional in the workbook; they are mapped to named fields here,
//! once, and nowhere else.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::workbook::Row;

// Column layout shared by the startup and accelerator sheets:
// [id, name, country, sector|focus, -, description, ...]
const COL_NAME: usize = 1;
const COL_COUNTRY: usize = 2;
const COL_SECTOR: usize = 3;
const COL_DESCRIPTION: usize = 5;

fn column(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupRecord {
    pub name: String,
    pub country: String,
    pub sector: String,
    pub description: String,
}

impl StartupRecord {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            name: column(row, COL_NAME),
            country: column(row, COL_COUNTRY),
            sector: column(row, COL_SECTOR),
            description: column(row, COL_DESCRIPTION),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceleratorRecord {
    pub name: String,
    pub country: String,
    pub focus: String,
    pub description: String,
}

impl AcceleratorRecord {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            name: column(row, COL_NAME),
            country: column(row, COL_COUNTRY),
            focus: column(row, COL_SECTOR),
            description: column(row, COL_DESCRIPTION),
        }
    }

    /// The accelerator text handed to the generator: focus, then description.
    pub fn info(&self) -> String {
        format!("{} - {}", self.focus, self.description)
    }
}

/// One line of the "Value Propositions" sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePropositionRecord {
    pub sequence_number: usize,
    pub startup_name: String,
    pub accelerator_name: String,
    pub match_score: f64,
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

impl ValuePropositionRecord {
    /// Column order: sequence, startup, accelerator, score (2 decimals), text, timestamp.
    pub fn to_row(&self) -> Row {
        vec![
            self.sequence_number.to_string(),
            self.startup_name.clone(),
            self.accelerator_name.clone(),
            format!("{:.2}", self.match_score),
            self.text.clone(),
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }

    /// Best-effort parse of a persisted row; `None` for rows that do not
    /// carry a numeric sequence number and score.
    pub fn from_row(row: &[String]) -> Option<Self> {
        Some(Self {
            sequence_number: column(row, 0).trim().parse().ok()?,
            startup_name: column(row, 1),
            accelerator_name: column(row, 2),
            match_score: column(row, 3).trim().parse().ok()?,
            text: column(row, 4),
            generated_at: DateTime::parse_from_rfc3339(column(row, 5).trim())
                .ok()?
                .with_timezone(&Utc),
        })
    }

    pub fn is_error(&self) -> bool {
        self.text.starts_with("ERRORE")
    }
}
