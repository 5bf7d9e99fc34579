//! Scouting settings, read from fixed cells of the Config sheet.
//!
//! | Cell | Setting          |
//! |------|------------------|
//! | B1   | API key          |
//! | B2   | max tokens       |
//! | B3   | model            |
//! | B4   | rate limit (ms)  |
//! | B5   | match threshold  |

use thiserror::Error;

use crate::workbook::{cell, Workbook, WorkbookError, CONFIG_SHEET};

const VALUE_COL: usize = 1; // column B

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ERRORE Config: Scheda Config non trovata")]
    Missing,

    #[error("ERRORE Config: la cella {cell} non contiene un numero ('{value}')")]
    InvalidNumber { cell: &'static str, value: String },

    #[error(transparent)]
    Workbook(#[from] WorkbookError),
}

/// Immutable for the duration of one operation.
#[derive(Clone)]
pub struct ScoutingConfig {
    pub api_key: String,
    pub max_tokens: u32,
    pub model: String,
    pub rate_limit_ms: u64,
    pub match_threshold: f64,
}

impl std::fmt::Debug for ScoutingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoutingConfig")
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("model", &self.model)
            .field("rate_limit_ms", &self.rate_limit_ms)
            .field("match_threshold", &self.match_threshold)
            .finish()
    }
}

pub async fn load_scouting_config(workbook: &dyn Workbook) -> Result<ScoutingConfig, ConfigError> {
    let rows = workbook
        .read_sheet(CONFIG_SHEET)
        .await?
        .ok_or(ConfigError::Missing)?;

    let text = |row: usize| cell(&rows, row, VALUE_COL).trim().to_string();

    Ok(ScoutingConfig {
        api_key: text(0),
        // `as` saturates: negatives clamp to 0, fractions truncate.
        max_tokens: number(&rows, 1, "B2")? as u32,
        model: text(2),
        rate_limit_ms: number(&rows, 3, "B4")? as u64,
        match_threshold: number(&rows, 4, "B5")?,
    })
}

/// Spreadsheet-style numeric coercion: a blank cell is 0.
fn number(rows: &[Vec<String>], row: usize, cell_name: &'static str) -> Result<f64, ConfigError> {
    let raw = cell(rows, row, VALUE_COL).trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            cell: cell_name,
            value: raw.to_string(),
        })
}
