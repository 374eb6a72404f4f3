use crate::domain::dashboard_config::TableLayout;
use crate::domain::error::{AppError, Result};
use crate::domain::identifier::{quote_identifier, Identifier};
use crate::domain::record::{CellValue, Record, SOURCE_FILE_COLUMN, STORED_DATE_FORMAT};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection};
use std::collections::HashSet;
use tracing::{debug, info};

use super::{existing_columns, RecordsRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub rows: u64,
    pub table_created: bool,
    pub columns_added: Vec<String>,
}

impl RecordsRepository {
    /// Append `records` in one transaction, growing the table to cover `columns`.
    ///
    /// Columns a record lacks are written as NULL.
    pub async fn append_records(
        &self,
        layout: &TableLayout,
        columns: &[String],
        records: &[Record],
    ) -> Result<AppendOutcome> {
        if columns.is_empty() {
            return Err(AppError::ValidationError(
                "Cannot append records without columns".to_string(),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let existing = existing_columns(&mut *tx, &layout.table).await?;
        let table_created = existing.is_empty();
        let columns_added = if table_created {
            create_table(&mut *tx, &layout.table, columns).await?;
            Vec::new()
        } else {
            add_missing_columns(&mut *tx, &layout.table, &existing, columns).await?
        };

        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            layout.table.quoted(),
            columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        debug!("Insert statement: {}", insert_sql);

        let mut affected: u64 = 0;
        for record in records {
            let mut query = sqlx::query(&insert_sql);
            for column in columns {
                query = bind_cell(query, record.value_or_null(column));
            }
            let res = query
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to insert record: {}", e)))?;
            affected += res.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))?;

        Ok(AppendOutcome {
            rows: affected,
            table_created,
            columns_added,
        })
    }

    pub async fn delete_by_source_file(&self, layout: &TableLayout, source_file: &str) -> Result<u64> {
        if !self.table_exists(&layout.table).await? {
            return Err(AppError::EmptyResult(format!(
                "Table '{}' does not exist yet",
                layout.table
            )));
        }

        let res = sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = ?",
            layout.table.quoted(),
            quote_identifier(SOURCE_FILE_COLUMN)
        ))
        .bind(source_file)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete records: {}", e)))?;

        info!(
            source_file = %source_file,
            rows = res.rows_affected(),
            "Deleted records by source file"
        );
        Ok(res.rows_affected())
    }
}

/// Columns are declared without a type so each value keeps its bound storage class.
async fn create_table(conn: &mut SqliteConnection, table: &Identifier, columns: &[String]) -> Result<()> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.quoted(),
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    );
    sqlx::query(&sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;

    info!(table = %table, columns = columns.len(), "Created records table");
    Ok(())
}

async fn add_missing_columns(
    conn: &mut SqliteConnection,
    table: &Identifier,
    existing: &[String],
    columns: &[String],
) -> Result<Vec<String>> {
    let known: HashSet<String> = existing.iter().map(|c| c.to_lowercase()).collect();
    let mut added = Vec::new();

    for column in columns {
        if known.contains(&column.to_lowercase()) {
            continue;
        }
        sqlx::query(&format!(
            "ALTER TABLE {} ADD COLUMN {}",
            table.quoted(),
            quote_identifier(column)
        ))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to add column '{}': {}", column, e))
        })?;
        added.push(column.clone());
    }

    if !added.is_empty() {
        info!(table = %table, added = ?added, "Added new upload columns");
    }
    Ok(added)
}

fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    cell: &'q CellValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match cell {
        CellValue::Null => query.bind(None::<String>),
        CellValue::Integer(i) => query.bind(*i),
        CellValue::Real(f) => query.bind(*f),
        CellValue::Text(s) => query.bind(s.as_str()),
        CellValue::Bool(b) => query.bind(*b),
        CellValue::Date(dt) => query.bind(dt.format(STORED_DATE_FORMAT).to_string()),
    }
}
