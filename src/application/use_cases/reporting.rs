use crate::application::use_cases::category_tree::build_category_tree;
use crate::application::use_cases::topic_classifier::TopicClassifier;
use crate::domain::dashboard_config::TableLayout;
use crate::domain::error::{AppError, Result};
use crate::domain::reports::{
    CategoryReport, GeographyReport, LabelCount, SummaryStats, TopicTally, YearTotal,
};
use crate::domain::year_filter::{YearFilter, ALL_YEARS_LABEL};
use crate::infrastructure::db::RecordsRepository;
use std::sync::Arc;
use tracing::{error, warn};

/// Read-only reports over the records table.
///
/// Every report first checks the table holds rows, so an empty database
/// surfaces as `EmptyResult` rather than a SQL error.
pub struct ReportingUseCase {
    repository: Arc<RecordsRepository>,
    layout: Arc<TableLayout>,
    classifier: TopicClassifier,
}

impl ReportingUseCase {
    pub fn new(repository: Arc<RecordsRepository>, layout: Arc<TableLayout>) -> Self {
        Self {
            repository,
            layout,
            classifier: TopicClassifier::default(),
        }
    }

    /// Year choices for the filter, "Todos" first. Never fails.
    pub async fn available_years(&self) -> Vec<String> {
        let mut years = vec![ALL_YEARS_LABEL.to_string()];
        match self.load_years().await {
            Ok(found) => years.extend(found),
            Err(e) => warn!(error = %e, "Falling back to the unfiltered year list"),
        }
        years
    }

    async fn load_years(&self) -> Result<Vec<String>> {
        self.repository.ensure_has_rows(&self.layout).await?;
        self.repository.available_years(&self.layout).await
    }

    pub async fn yearly_totals(&self) -> Result<Vec<YearTotal>> {
        self.repository.ensure_has_rows(&self.layout).await?;
        self.repository.yearly_totals(&self.layout).await
    }

    pub async fn summary(&self, filter: &YearFilter) -> Result<SummaryStats> {
        self.repository.ensure_has_rows(&self.layout).await?;
        let (total_rows, unique_ids) = self.repository.summary_counts(&self.layout, filter).await?;
        Ok(SummaryStats::from_counts(filter.label(), total_rows, unique_ids))
    }

    pub async fn institutions(&self, filter: &YearFilter) -> Result<Vec<LabelCount>> {
        self.repository.ensure_has_rows(&self.layout).await?;
        self.repository.institution_tally(&self.layout, filter).await
    }

    pub async fn geography(&self, filter: &YearFilter) -> Result<GeographyReport> {
        self.repository.ensure_has_rows(&self.layout).await?;
        let (states, municipalities, parishes) =
            self.repository.geography_counts(&self.layout, filter).await?;
        let by_state = self.repository.state_tally(&self.layout, filter).await?;

        Ok(GeographyReport {
            year: filter.label().to_string(),
            states,
            municipalities,
            parishes,
            by_state,
        })
    }

    pub async fn categories(&self, filter: &YearFilter) -> Result<CategoryReport> {
        self.repository.ensure_has_rows(&self.layout).await?;
        let rows = self.repository.category_rows(&self.layout, filter).await?;
        let tree = build_category_tree(&rows);

        Ok(CategoryReport {
            year: filter.label().to_string(),
            rows,
            tree,
        })
    }

    /// Topic tally over the whole table; the year filter does not apply.
    pub async fn topics(&self) -> Result<Vec<TopicTally>> {
        self.repository.ensure_has_rows(&self.layout).await?;
        let rows = self
            .repository
            .category_texts(&self.layout)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load rows for topic classification");
                AppError::ClassifierFailure(e.to_string())
            })?;

        Ok(self.classifier.tally(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{CellValue, Record, SOURCE_FILE_COLUMN};
    use crate::infrastructure::db::records::test_support::{
        default_layout, memory_repository, record, text,
    };
    use crate::shared::number_format::format_decimal;

    const COLUMNS: [&str; 10] = [
        "cedula",
        "fecha",
        "institucion",
        "estado",
        "municipio",
        "parroquia",
        "SubCatg1",
        "SubCatg2",
        "SubCatg3",
        "SubCatg4",
    ];

    fn participant(id: i64, year: &str, state: &str, topic: &str) -> Record {
        record(&[
            ("cedula", CellValue::Integer(id)),
            ("fecha", text(&format!("{}-06-01 00:00:00", year))),
            ("institucion", text("Liceo")),
            ("estado", text(state)),
            ("municipio", text("Centro")),
            ("parroquia", text("Catedral")),
            ("SubCatg1", text("Ciencia")),
            ("SubCatg2", text(topic)),
            ("SubCatg3", text("Taller")),
            ("SubCatg4", text("Básico")),
        ])
    }

    async fn reporting_with(records: Vec<Record>) -> ReportingUseCase {
        let repo = memory_repository().await;
        let layout = default_layout();
        if !records.is_empty() {
            let mut columns: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
            columns.push(SOURCE_FILE_COLUMN.to_string());
            repo.append_records(&layout, &columns, &records).await.unwrap();
        }
        ReportingUseCase::new(Arc::new(repo), Arc::new(layout))
    }

    #[tokio::test]
    async fn test_year_filter_restricts_every_report() {
        let reporting = reporting_with(vec![
            participant(1, "2022", "Zulia", "Robótica"),
            participant(2, "2022", "Lara", "Robótica"),
            participant(3, "2023", "Zulia", "Astronomía"),
        ])
        .await;
        let y2023 = YearFilter::Year("2023".to_string());

        let summary = reporting.summary(&y2023).await.unwrap();
        assert_eq!(summary.total_rows, 1);
        assert_eq!(summary.year, "2023");
        assert_eq!(reporting.summary(&YearFilter::All).await.unwrap().total_rows, 3);

        let geography = reporting.geography(&y2023).await.unwrap();
        assert_eq!(geography.states, 1);
        assert_eq!(geography.by_state.len(), 1);

        let categories = reporting.categories(&y2023).await.unwrap();
        assert_eq!(categories.rows.len(), 1);
        assert_eq!(categories.tree[0].span, 1);

        let institutions = reporting.institutions(&y2023).await.unwrap();
        assert_eq!(institutions[0].total, 1);
    }

    #[tokio::test]
    async fn test_duplicate_percentage_for_repeated_ids() {
        let records: Vec<Record> = (0..100)
            .map(|i| participant(i % 80, "2023", "Zulia", "Robótica"))
            .collect();
        let reporting = reporting_with(records).await;

        let summary = reporting.summary(&YearFilter::All).await.unwrap();
        assert_eq!(summary.unique_ids, 80);
        assert_eq!(format_decimal(&summary.duplicate_percentage), "20,00");
    }

    #[tokio::test]
    async fn test_empty_database_reports_no_data() {
        let reporting = reporting_with(Vec::new()).await;

        let err = reporting.summary(&YearFilter::All).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyResult(_)));
        assert!(matches!(reporting.topics().await, Err(AppError::EmptyResult(_))));
        assert_eq!(reporting.available_years().await, vec![ALL_YEARS_LABEL]);
    }

    #[tokio::test]
    async fn test_years_listed_after_todos() {
        let reporting = reporting_with(vec![
            participant(1, "2022", "Zulia", "Robótica"),
            participant(2, "2023", "Lara", "Robótica"),
        ])
        .await;

        assert_eq!(
            reporting.available_years().await,
            vec![ALL_YEARS_LABEL, "2023", "2022"]
        );
        let totals = reporting.yearly_totals().await.unwrap();
        assert_eq!(totals.len(), 2);
    }

    #[tokio::test]
    async fn test_topics_ignore_year_filter() {
        let reporting = reporting_with(vec![
            participant(1, "2022", "Zulia", "Robótica"),
            participant(2, "2023", "Lara", "Robótica y Programación"),
            participant(3, "2023", "Lara", "Astronomía"),
        ])
        .await;

        let topics = reporting.topics().await.unwrap();
        assert_eq!(topics[0].area, "Robótica");
        assert_eq!(topics[0].count, 2);
        assert_eq!(topics[1].area, "Astronomía");
    }
}
