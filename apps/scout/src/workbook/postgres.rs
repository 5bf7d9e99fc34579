use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{Row, Workbook, WorkbookError};

/// PostgreSQL-backed workbook.
///
/// Layout: `sheets(name)` registers which sheets exist; `sheet_rows` holds
/// the cells of each row as `TEXT[]`, ordered by a 1-based `row_number`.
#[derive(Clone)]
pub struct PgWorkbook {
    pool: PgPool,
}

impl PgWorkbook {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn sheet_exists(&self, sheet: &str) -> Result<bool, WorkbookError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sheets WHERE name = $1)")
            .bind(sheet)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn require_sheet(&self, sheet: &str) -> Result<(), WorkbookError> {
        if self.sheet_exists(sheet).await? {
            Ok(())
        } else {
            Err(WorkbookError::SheetNotFound(sheet.to_string()))
        }
    }
}

#[async_trait]
impl Workbook for PgWorkbook {
    async fn read_sheet(&self, sheet: &str) -> Result<Option<Vec<Row>>, WorkbookError> {
        if !self.sheet_exists(sheet).await? {
            return Ok(None);
        }

        let rows: Vec<Vec<String>> = sqlx::query_scalar(
            "SELECT cells FROM sheet_rows WHERE sheet = $1 ORDER BY row_number",
        )
        .bind(sheet)
        .fetch_all(&self.pool)
        .await?;

        debug!("Read {} rows from sheet '{sheet}'", rows.len());
        Ok(Some(rows))
    }

    async fn clear_data_rows(&self, sheet: &str) -> Result<usize, WorkbookError> {
        self.require_sheet(sheet).await?;

        let result = sqlx::query("DELETE FROM sheet_rows WHERE sheet = $1 AND row_number > 1")
            .bind(sheet)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() as usize)
    }

    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), WorkbookError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the sheet serializes appenders, so MAX + 1 stays unique.
        let locked: Option<String> =
            sqlx::query_scalar("SELECT name FROM sheets WHERE name = $1 FOR UPDATE")
                .bind(sheet)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(WorkbookError::SheetNotFound(sheet.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO sheet_rows (sheet, row_number, cells)
            SELECT $1, COALESCE(MAX(row_number), 0) + 1, $2
            FROM sheet_rows
            WHERE sheet = $1
            "#,
        )
        .bind(sheet)
        .bind(&row)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
