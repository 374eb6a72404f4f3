use crate::domain::dashboard_config::TableLayout;
use crate::domain::error::{AppError, Result};
use crate::domain::record::{
    SheetTable, UploadedFile, LOAD_TIMESTAMP_COLUMN, LOAD_TIMESTAMP_FORMAT, SOURCE_FILE_COLUMN,
};
use crate::domain::reports::{DeletionReport, FileIngestion, IngestionReport, UploadHistoryEntry};
use crate::infrastructure::db::RecordsRepository;
use crate::infrastructure::spreadsheet::read_upload;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

mod dates;

pub use dates::coerce_date;

/// Loads uploads into the records table and removes them again by file name.
///
/// Ingestion batches and deletions share `write_lock`, so at most one writer
/// touches the table at a time.
pub struct IngestionUseCase {
    repository: Arc<RecordsRepository>,
    layout: Arc<TableLayout>,
    write_lock: Arc<Mutex<()>>,
}

impl IngestionUseCase {
    pub fn new(
        repository: Arc<RecordsRepository>,
        layout: Arc<TableLayout>,
        write_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            repository,
            layout,
            write_lock,
        }
    }

    /// Ingest every file in order under a single load timestamp.
    ///
    /// A failing file aborts the batch; files before it stay committed.
    pub async fn ingest_uploads(&self, files: Vec<UploadedFile>) -> Result<IngestionReport> {
        if files.is_empty() {
            return Err(AppError::ValidationError("No files to ingest".to_string()));
        }

        let load_timestamp = Local::now().format(LOAD_TIMESTAMP_FORMAT).to_string();
        let _guard = self.write_lock.lock().await;

        let mut report = IngestionReport {
            load_timestamp: load_timestamp.clone(),
            files: Vec::with_capacity(files.len()),
        };

        for file in files {
            let table = read_upload(&file.file_name, &file.bytes).map_err(|e| {
                warn!(file = %file.file_name, error = %e, "Upload could not be read");
                e
            })?;
            let ingested = self
                .ingest_table(&file.file_name, table, &load_timestamp)
                .await?;
            report.files.push(ingested);
        }

        info!(
            files = report.files.len(),
            rows = report.total_rows(),
            load_timestamp = %report.load_timestamp,
            "Ingestion batch complete"
        );
        Ok(report)
    }

    async fn ingest_table(
        &self,
        source_file: &str,
        table: SheetTable,
        load_timestamp: &str,
    ) -> Result<FileIngestion> {
        // Provenance columns are always ours, even if the upload carries its own.
        let mut columns: Vec<String> = table
            .columns
            .iter()
            .filter(|c| {
                !c.eq_ignore_ascii_case(SOURCE_FILE_COLUMN)
                    && !c.eq_ignore_ascii_case(LOAD_TIMESTAMP_COLUMN)
            })
            .cloned()
            .collect();
        let date_column = columns.iter().find(|c| self.layout.date.matches(c)).cloned();
        columns.push(SOURCE_FILE_COLUMN.to_string());
        columns.push(LOAD_TIMESTAMP_COLUMN.to_string());

        let mut records = table.into_records();
        for record in records.iter_mut() {
            if let Some(column) = &date_column {
                if let Some(cell) = record.get_mut(column) {
                    *cell = coerce_date(cell);
                }
            }
            record.stamp_provenance(source_file, load_timestamp);
        }

        let outcome = self
            .repository
            .append_records(&self.layout, &columns, &records)
            .await?;

        info!(
            source_file = %source_file,
            rows = outcome.rows,
            table_created = outcome.table_created,
            columns_added = outcome.columns_added.len(),
            "Ingested file"
        );

        Ok(FileIngestion {
            source_file: source_file.to_string(),
            rows: outcome.rows,
            table_created: outcome.table_created,
            columns_added: outcome.columns_added,
        })
    }

    /// Remove every row loaded from `source_file`.
    pub async fn delete_source_file(&self, source_file: &str) -> Result<DeletionReport> {
        let source_file = source_file.trim();
        if source_file.is_empty() {
            return Err(AppError::ValidationError(
                "Source file name cannot be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let rows_deleted = self
            .repository
            .delete_by_source_file(&self.layout, source_file)
            .await?;

        Ok(DeletionReport {
            source_file: source_file.to_string(),
            rows_deleted,
        })
    }

    pub async fn upload_history(&self) -> Result<Vec<UploadHistoryEntry>> {
        self.repository.ensure_has_rows(&self.layout).await?;
        self.repository.upload_history(&self.layout).await
    }
}
