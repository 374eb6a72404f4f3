pub mod dashboard_config;
pub mod error;
pub mod identifier;
pub mod record;
pub mod reports;
pub mod year_filter;
