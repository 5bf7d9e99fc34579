//! Tabular data store — the spreadsheet-shaped persistence layer.
//!
//! Every sheet is an ordered list of rows; row 1 is always the header.
//! Components never reach for a global document handle: the workbook is
//! passed in explicitly as `&dyn Workbook` (or held as `Arc<dyn Workbook>`).

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgWorkbook;

pub const CONFIG_SHEET: &str = "Config";
pub const STARTUP_SHEET: &str = "Database Startup";
pub const ACCELERATOR_SHEET: &str = "Database Acceleratori";
pub const RESULTS_SHEET: &str = "Value Propositions";

/// One sheet row, cells in column order.
pub type Row = Vec<String>;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Scheda '{0}' non trovata")]
    SheetNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Workbook: Send + Sync {
    /// Returns every row of the sheet, header included.
    /// `None` when the sheet does not exist.
    async fn read_sheet(&self, sheet: &str) -> Result<Option<Vec<Row>>, WorkbookError>;

    /// Deletes all rows below the header. Returns the number of rows removed.
    async fn clear_data_rows(&self, sheet: &str) -> Result<usize, WorkbookError>;

    /// Appends a row after the current last row.
    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), WorkbookError>;
}

/// Reads cell `(row, col)` (both 0-based) as a string. Absent cells are empty.
pub fn cell(rows: &[Row], row: usize, col: usize) -> &str {
    rows.get(row)
        .and_then(|r| r.get(col))
        .map(String::as_str)
        .unwrap_or("")
}
