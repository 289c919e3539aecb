//! `SQLite` schema bootstrap logic.
//!
//! The table definition uses `CREATE TABLE IF NOT EXISTS` and is safe to
//! re-run on every startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply the key-value table definition to the connected database.
///
/// # Errors
///
/// Returns `AppError::Storage` if the DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key             TEXT PRIMARY KEY NOT NULL,
    value           TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
