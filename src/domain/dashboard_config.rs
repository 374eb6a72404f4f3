use crate::domain::error::Result;
use crate::domain::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw, externally supplied configuration.
///
/// Every name here is free text until [`DashboardConfig::layout`] validates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub database_path: String,
    pub table_name: String,
    pub id_column: String,
    pub date_column: String,
    pub institution_column: String,
    pub category_columns: [String; 4],
    pub state_column: String,
    pub municipality_column: String,
    pub parish_column: String,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a JSON upload body (base64 inflates files by a third).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            database_path: "base_datos_pnsc.db".to_string(),
            table_name: "consolidado_total".to_string(),
            id_column: "cedula".to_string(),
            date_column: "fecha".to_string(),
            institution_column: "institucion".to_string(),
            category_columns: [
                "SubCatg1".to_string(),
                "SubCatg2".to_string(),
                "SubCatg3".to_string(),
                "SubCatg4".to_string(),
            ],
            state_column: "estado".to_string(),
            municipality_column: "municipio".to_string(),
            parish_column: "parroquia".to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Database file path; `.db` is appended when the configured name lacks it.
    pub fn database_file(&self) -> PathBuf {
        let name = self.database_path.trim();
        if name.ends_with(".db") {
            PathBuf::from(name)
        } else {
            PathBuf::from(format!("{}.db", name))
        }
    }

    /// Validate every configured identifier and freeze them into a layout.
    pub fn layout(&self) -> Result<TableLayout> {
        Ok(TableLayout {
            table: Identifier::parse("table", &self.table_name)?,
            id: Identifier::parse("identifier column", &self.id_column)?,
            date: Identifier::parse("date column", &self.date_column)?,
            institution: Identifier::parse("institution column", &self.institution_column)?,
            categories: [
                Identifier::parse("category level 1 column", &self.category_columns[0])?,
                Identifier::parse("category level 2 column", &self.category_columns[1])?,
                Identifier::parse("category level 3 column", &self.category_columns[2])?,
                Identifier::parse("category level 4 column", &self.category_columns[3])?,
            ],
            state: Identifier::parse("state column", &self.state_column)?,
            municipality: Identifier::parse("municipality column", &self.municipality_column)?,
            parish: Identifier::parse("parish column", &self.parish_column)?,
        })
    }
}

/// Validated table and column names, passed into every repository call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: Identifier,
    pub id: Identifier,
    pub date: Identifier,
    pub institution: Identifier,
    pub categories: [Identifier; 4],
    pub state: Identifier,
    pub municipality: Identifier,
    pub parish: Identifier,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = DashboardConfig::default().layout().unwrap();
        assert_eq!(layout.table.as_str(), "consolidado_total");
        assert_eq!(layout.categories[3].as_str(), "SubCatg4");
    }

    #[test]
    fn test_database_file_appends_extension() {
        let mut config = DashboardConfig::default();
        assert_eq!(config.database_file(), PathBuf::from("base_datos_pnsc.db"));

        config.database_path = "otra_base".to_string();
        assert_eq!(config.database_file(), PathBuf::from("otra_base.db"));
    }

    #[test]
    fn test_layout_rejects_bad_column() {
        let config = DashboardConfig {
            state_column: "estado\" OR 1=1".to_string(),
            ..DashboardConfig::default()
        };
        match config.layout() {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("state column")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
