use std::sync::Arc;

use tracing::info;

use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::error::Result;
use crate::infrastructure::db::RecordsRepository;
use crate::interfaces::state::AppState;

/// Open the database and wire the use cases for `config`.
pub async fn bootstrap(config: DashboardConfig) -> Result<AppState> {
    let db_file = config.database_file();
    let repository = Arc::new(RecordsRepository::connect(&db_file).await?);

    info!(
        database = %db_file.display(),
        table = %config.table_name,
        "Records database ready"
    );

    AppState::new(config, repository)
}
