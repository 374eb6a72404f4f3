//! The consolidated records table.
//!
//! Its column set is whatever the uploads brought plus the provenance columns,
//! so statements are assembled at runtime from validated [`Identifier`]s (or
//! quoted upload headers) and every literal value is bound.

use crate::domain::dashboard_config::TableLayout;
use crate::domain::error::{AppError, Result};
use crate::domain::identifier::Identifier;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use std::path::Path;

use super::connection::connect_pool;

mod aggregates;
mod writes;

pub use writes::AppendOutcome;

pub struct RecordsRepository {
    pool: SqlitePool,
}

impl RecordsRepository {
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let pool = connect_pool(db_path).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn table_exists(&self, table: &Identifier) -> Result<bool> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND lower(name) = lower(?)",
        )
        .bind(table.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::QueryFailure(format!("Failed to check table existence: {}", e)))?;

        Ok(found.is_some())
    }

    /// Column names of `table`; empty when the table does not exist.
    pub async fn table_columns(&self, table: &Identifier) -> Result<Vec<String>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to acquire connection: {}", e)))?;
        existing_columns(&mut *conn, table).await
    }

    pub async fn count_rows(&self, layout: &TableLayout) -> Result<i64> {
        if !self.table_exists(&layout.table).await? {
            return Ok(0);
        }
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", layout.table.quoted()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to count rows: {}", e)))
    }

    /// `QueryFailure` naming every column in `required` that the table lacks.
    pub async fn ensure_columns(&self, table: &Identifier, required: &[&str]) -> Result<()> {
        let existing = self.table_columns(table).await?;
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !existing.iter().any(|c| c.eq_ignore_ascii_case(name)))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::QueryFailure(format!(
                "Table '{}' is missing column(s): {}",
                table,
                missing.join(", ")
            )))
        }
    }

    /// `EmptyResult` unless the table exists and holds at least one row.
    pub async fn ensure_has_rows(&self, layout: &TableLayout) -> Result<()> {
        if !self.table_exists(&layout.table).await? {
            return Err(AppError::EmptyResult(format!(
                "Table '{}' does not exist yet",
                layout.table
            )));
        }
        if self.count_rows(layout).await? == 0 {
            return Err(AppError::EmptyResult(format!(
                "Table '{}' has no rows",
                layout.table
            )));
        }
        Ok(())
    }
}

async fn existing_columns(conn: &mut SqliteConnection, table: &Identifier) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table.quoted()))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::QueryFailure(format!("Failed to inspect {} schema: {}", table, e)))?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("name").map_err(|e| {
                AppError::QueryFailure(format!("Failed to read {} schema: {}", table, e))
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::dashboard_config::DashboardConfig;
    use crate::domain::record::{CellValue, Record};
    use crate::infrastructure::db::connection::memory_pool;

    pub async fn memory_repository() -> RecordsRepository {
        RecordsRepository::from_pool(memory_pool().await)
    }

    pub fn default_layout() -> TableLayout {
        DashboardConfig::default().layout().unwrap()
    }

    pub fn record(values: &[(&str, CellValue)]) -> Record {
        let mut record = Record::new();
        for (column, value) in values {
            record.insert(*column, value.clone());
        }
        record
    }

    pub fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }
}
