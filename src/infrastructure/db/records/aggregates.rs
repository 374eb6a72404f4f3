use crate::domain::dashboard_config::TableLayout;
use crate::domain::error::{AppError, Result};
use crate::domain::identifier::quote_identifier;
use crate::domain::record::{LOAD_TIMESTAMP_COLUMN, SOURCE_FILE_COLUMN};
use crate::domain::reports::{CategoryRow, LabelCount, StateTally, UploadHistoryEntry, YearTotal};
use crate::domain::year_filter::YearFilter;
use tracing::debug;

use super::RecordsRepository;

type CategoryTuple = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

/// Columns a filtered aggregate reads; the date column only matters once a
/// year is selected.
fn filtered_columns<'a>(
    layout: &'a TableLayout,
    filter: &YearFilter,
    columns: &[&'a str],
) -> Vec<&'a str> {
    let mut required = columns.to_vec();
    if filter.bind_value().is_some() {
        required.push(layout.date.as_str());
    }
    required
}

impl RecordsRepository {
    /// Total rows and distinct identifiers under `filter`.
    pub async fn summary_counts(
        &self,
        layout: &TableLayout,
        filter: &YearFilter,
    ) -> Result<(i64, i64)> {
        let required = filtered_columns(layout, filter, &[layout.id.as_str()]);
        self.ensure_columns(&layout.table, &required).await?;

        let sql = format!(
            "SELECT COUNT(*), COUNT(DISTINCT {id}) FROM {table} WHERE {cond}",
            id = layout.id.quoted(),
            table = layout.table.quoted(),
            cond = filter.sql_condition(&layout.date),
        );
        debug!("Summary query: {}", sql);

        let mut query = sqlx::query_as::<_, (i64, i64)>(&sql);
        if let Some(year) = filter.bind_value() {
            query = query.bind(year);
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to compute summary: {}", e)))
    }

    pub async fn institution_tally(
        &self,
        layout: &TableLayout,
        filter: &YearFilter,
    ) -> Result<Vec<LabelCount>> {
        self.ensure_columns(
            &layout.table,
            &filtered_columns(layout, filter, &[layout.institution.as_str()]),
        )
        .await?;

        let sql = format!(
            "SELECT CAST({col} AS TEXT) AS label, COUNT(*) AS total \
             FROM {table} WHERE {cond} GROUP BY {col} ORDER BY total DESC, label ASC",
            col = layout.institution.quoted(),
            table = layout.table.quoted(),
            cond = filter.sql_condition(&layout.date),
        );
        debug!("Institution query: {}", sql);

        let mut query = sqlx::query_as::<_, (Option<String>, i64)>(&sql);
        if let Some(year) = filter.bind_value() {
            query = query.bind(year);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to tally institutions: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(label, total)| LabelCount { label, total })
            .collect())
    }

    /// Distinct states, municipalities and parishes under `filter`.
    pub async fn geography_counts(
        &self,
        layout: &TableLayout,
        filter: &YearFilter,
    ) -> Result<(i64, i64, i64)> {
        self.ensure_columns(
            &layout.table,
            &filtered_columns(
                layout,
                filter,
                &[
                    layout.state.as_str(),
                    layout.municipality.as_str(),
                    layout.parish.as_str(),
                ],
            ),
        )
        .await?;

        let sql = format!(
            "SELECT COUNT(DISTINCT {state}), COUNT(DISTINCT {municipality}), COUNT(DISTINCT {parish}) \
             FROM {table} WHERE {cond}",
            state = layout.state.quoted(),
            municipality = layout.municipality.quoted(),
            parish = layout.parish.quoted(),
            table = layout.table.quoted(),
            cond = filter.sql_condition(&layout.date),
        );

        let mut query = sqlx::query_as::<_, (i64, i64, i64)>(&sql);
        if let Some(year) = filter.bind_value() {
            query = query.bind(year);
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to count geography: {}", e)))
    }

    pub async fn state_tally(
        &self,
        layout: &TableLayout,
        filter: &YearFilter,
    ) -> Result<Vec<StateTally>> {
        self.ensure_columns(
            &layout.table,
            &filtered_columns(layout, filter, &[layout.state.as_str(), layout.id.as_str()]),
        )
        .await?;

        let sql = format!(
            "SELECT CAST({state} AS TEXT) AS label, COUNT(*) AS total, COUNT(DISTINCT {id}) AS unique_ids \
             FROM {table} WHERE {cond} GROUP BY {state} ORDER BY total DESC, label ASC",
            state = layout.state.quoted(),
            id = layout.id.quoted(),
            table = layout.table.quoted(),
            cond = filter.sql_condition(&layout.date),
        );

        let mut query = sqlx::query_as::<_, (Option<String>, i64, i64)>(&sql);
        if let Some(year) = filter.bind_value() {
            query = query.bind(year);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to tally states: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(state, total, unique_ids)| StateTally {
                state,
                total,
                unique_ids,
            })
            .collect())
    }

    /// Leaf tallies of the four category levels, parents first then count.
    pub async fn category_rows(
        &self,
        layout: &TableLayout,
        filter: &YearFilter,
    ) -> Result<Vec<CategoryRow>> {
        let mut required: Vec<&str> = layout.categories.iter().map(|c| c.as_str()).collect();
        required.push(layout.id.as_str());
        self.ensure_columns(&layout.table, &filtered_columns(layout, filter, &required))
            .await?;

        let [c1, c2, c3, c4] = &layout.categories;
        let (c1, c2, c3, c4) = (c1.quoted(), c2.quoted(), c3.quoted(), c4.quoted());
        let sql = format!(
            "SELECT CAST({c1} AS TEXT), CAST({c2} AS TEXT), CAST({c3} AS TEXT), CAST({c4} AS TEXT), \
                    COUNT(*) AS total, COUNT(DISTINCT {id}) AS unique_ids \
             FROM {table} WHERE {cond} \
             GROUP BY {c1}, {c2}, {c3}, {c4} \
             ORDER BY {c1}, {c2}, {c3}, total DESC",
            id = layout.id.quoted(),
            table = layout.table.quoted(),
            cond = filter.sql_condition(&layout.date),
        );
        debug!("Category query: {}", sql);

        let mut query = sqlx::query_as::<_, CategoryTuple>(&sql);
        if let Some(year) = filter.bind_value() {
            query = query.bind(year);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to tally categories: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(l1, l2, l3, l4, total, unique_ids)| CategoryRow {
                levels: [l1, l2, l3, l4],
                total,
                unique_ids,
            })
            .collect())
    }

    /// The four category values of every row; absent columns read as NULL.
    pub async fn category_texts(&self, layout: &TableLayout) -> Result<Vec<[Option<String>; 4]>> {
        let existing = self.table_columns(&layout.table).await?;
        let select = layout
            .categories
            .iter()
            .map(|column| {
                if existing.iter().any(|c| column.matches(c)) {
                    format!("CAST({} AS TEXT)", column.quoted())
                } else {
                    "NULL".to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let rows = sqlx::query_as::<_, (Option<String>, Option<String>, Option<String>, Option<String>)>(
            &format!("SELECT {} FROM {}", select, layout.table.quoted()),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::QueryFailure(format!("Failed to read categories: {}", e)))?;

        Ok(rows.into_iter().map(|(a, b, c, d)| [a, b, c, d]).collect())
    }

    /// Distinct years present in the date column, newest first.
    pub async fn available_years(&self, layout: &TableLayout) -> Result<Vec<String>> {
        self.ensure_columns(&layout.table, &[layout.date.as_str()]).await?;

        let date = layout.date.quoted();
        let sql = format!(
            "SELECT DISTINCT substr({date}, 1, 4) AS year FROM {table} \
             WHERE {date} IS NOT NULL ORDER BY year DESC",
            table = layout.table.quoted(),
        );

        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to list years: {}", e)))
    }

    /// Row count per year over the whole table, newest first.
    pub async fn yearly_totals(&self, layout: &TableLayout) -> Result<Vec<YearTotal>> {
        self.ensure_columns(&layout.table, &[layout.date.as_str()]).await?;

        let sql = format!(
            "SELECT substr({date}, 1, 4) AS year, COUNT(*) AS total FROM {table} \
             GROUP BY year ORDER BY year DESC",
            date = layout.date.quoted(),
            table = layout.table.quoted(),
        );

        let rows = sqlx::query_as::<_, (Option<String>, i64)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to total years: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(year, total)| YearTotal { year, total })
            .collect())
    }

    /// One entry per (file, load time), most recently loaded first.
    pub async fn upload_history(&self, layout: &TableLayout) -> Result<Vec<UploadHistoryEntry>> {
        self.ensure_columns(&layout.table, &[SOURCE_FILE_COLUMN, LOAD_TIMESTAMP_COLUMN])
            .await?;

        let sql = format!(
            "SELECT CAST({source} AS TEXT), CAST({loaded} AS TEXT), COUNT(*) \
             FROM {table} GROUP BY {source}, {loaded} ORDER BY MAX(rowid) DESC",
            source = quote_identifier(SOURCE_FILE_COLUMN),
            loaded = quote_identifier(LOAD_TIMESTAMP_COLUMN),
            table = layout.table.quoted(),
        );

        let rows = sqlx::query_as::<_, (Option<String>, Option<String>, i64)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::QueryFailure(format!("Failed to read upload history: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(source_file, load_timestamp, rows)| UploadHistoryEntry {
                source_file: source_file.unwrap_or_default(),
                load_timestamp: load_timestamp.unwrap_or_default(),
                rows,
            })
            .collect())
    }
}
