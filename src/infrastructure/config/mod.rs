use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::error::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};

/// Overrides the TOML file location.
pub const CONFIG_PATH_ENV: &str = "CONSOLIDADOR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "consolidador.toml";
pub const ENV_PREFIX: &str = "CONSOLIDADOR_";

pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn load_config() -> Result<DashboardConfig> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file if it exists, then `CONSOLIDADOR_*` variables
/// (`__` separates nested keys, e.g. `CONSOLIDADOR_SERVER__PORT`).
///
/// Identifiers are validated here so a bad name fails at startup.
pub fn load_config_from(path: &Path) -> Result<DashboardConfig> {
    let config: DashboardConfig = Figment::from(Serialized::defaults(DashboardConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    config.layout()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = load_config_from(Path::new("missing.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config, DashboardConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "consolidador.toml",
                r#"
                    table_name = "registro_2024"
                    category_columns = ["Area", "Linea", "Tema", "Nivel"]

                    [server]
                    port = 8080
                "#,
            )?;
            jail.set_env("CONSOLIDADOR_TABLE_NAME", "registro_env");
            jail.set_env("CONSOLIDADOR_SERVER__HOST", "0.0.0.0");

            let config =
                load_config_from(Path::new("consolidador.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.table_name, "registro_env");
            assert_eq!(config.category_columns[1], "Linea");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.id_column, "cedula");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_identifier_rejected_at_load() {
        Jail::expect_with(|jail| {
            jail.set_env("CONSOLIDADOR_ID_COLUMN", "cedula; DROP TABLE x");
            match load_config_from(Path::new("missing.toml")) {
                Err(AppError::ValidationError(msg)) => assert!(msg.contains("identifier column")),
                other => panic!("expected validation error, got {:?}", other),
            }
            Ok(())
        });
    }
}
