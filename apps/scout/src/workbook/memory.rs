use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Row, Workbook, WorkbookError};

/// In-process workbook for tests.
#[derive(Default)]
pub struct MemoryWorkbook {
    sheets: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a sheet with the given rows, header first.
    pub fn with_sheet(self, name: &str, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.sheets
            .lock()
            .unwrap()
            .insert(name.to_string(), rows);
        self
    }

    pub fn rows(&self, name: &str) -> Option<Vec<Row>> {
        self.sheets.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl Workbook for MemoryWorkbook {
    async fn read_sheet(&self, sheet: &str) -> Result<Option<Vec<Row>>, WorkbookError> {
        Ok(self.rows(sheet))
    }

    async fn clear_data_rows(&self, sheet: &str) -> Result<usize, WorkbookError> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
        let removed = rows.len().saturating_sub(1);
        rows.truncate(1);
        Ok(removed)
    }

    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), WorkbookError> {
        let mut sheets = self.sheets.lock().unwrap();
        sheets
            .get_mut(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?
            .push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_keeps_header() {
        let wb = MemoryWorkbook::new().with_sheet("S", vec![vec!["h"], vec!["a"], vec!["b"]]);
        let removed = wb.clear_data_rows("S").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(wb.rows("S").unwrap(), vec![vec!["h".to_string()]]);
    }

    #[tokio::test]
    async fn test_missing_sheet_reads_none_and_rejects_writes() {
        let wb = MemoryWorkbook::new();
        assert!(wb.read_sheet("Nope").await.unwrap().is_none());
        assert!(matches!(
            wb.append_row("Nope", vec![]).await,
            Err(WorkbookError::SheetNotFound(_))
        ));
    }
}
