use crate::application::{IngestionUseCase, ReportingUseCase};
use crate::domain::dashboard_config::{DashboardConfig, TableLayout};
use crate::domain::error::Result;
use crate::infrastructure::db::RecordsRepository;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub config: DashboardConfig,
    pub layout: Arc<TableLayout>,
    pub ingestion_use_case: IngestionUseCase,
    pub reporting_use_case: ReportingUseCase,
}

impl AppState {
    pub fn new(config: DashboardConfig, repository: Arc<RecordsRepository>) -> Result<Self> {
        let layout = Arc::new(config.layout()?);
        let write_lock = Arc::new(Mutex::new(()));

        Ok(Self {
            ingestion_use_case: IngestionUseCase::new(
                repository.clone(),
                layout.clone(),
                write_lock,
            ),
            reporting_use_case: ReportingUseCase::new(repository, layout.clone()),
            layout,
            config,
        })
    }
}
