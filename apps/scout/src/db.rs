use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the workbook tables if they do not exist yet.
/// Sheets themselves are never created here: a missing sheet is a reportable condition.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS sheets (name TEXT PRIMARY KEY)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sheet_rows (
            sheet      TEXT    NOT NULL REFERENCES sheets(name) ON DELETE CASCADE,
            row_number INTEGER NOT NULL,
            cells      TEXT[]  NOT NULL,
            PRIMARY KEY (sheet, row_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Workbook schema ready");
    Ok(())
}
