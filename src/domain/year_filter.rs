use crate::domain::error::{AppError, Result};
use crate::domain::identifier::Identifier;
use std::fmt;
use std::str::FromStr;

/// Label of the "no filter" option.
pub const ALL_YEARS_LABEL: &str = "Todos";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    /// Four ASCII digits.
    Year(String),
}

impl YearFilter {
    /// `None`, empty, "Todos" and "all" all mean no filter.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(YearFilter::All),
            Some(value) => value.parse(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            YearFilter::All => ALL_YEARS_LABEL,
            YearFilter::Year(year) => year,
        }
    }

    /// WHERE condition for `date_column`; pair it with [`YearFilter::bind_value`].
    ///
    /// The year is the first four characters of the stored date text.
    pub fn sql_condition(&self, date_column: &Identifier) -> String {
        match self {
            YearFilter::All => "1=1".to_string(),
            YearFilter::Year(_) => format!("substr({}, 1, 4) = ?", date_column.quoted()),
        }
    }

    pub fn bind_value(&self) -> Option<&str> {
        match self {
            YearFilter::All => None,
            YearFilter::Year(year) => Some(year),
        }
    }
}

impl FromStr for YearFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case(ALL_YEARS_LABEL) || value.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::All);
        }
        if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(YearFilter::Year(value.to_string()));
        }
        Err(AppError::ValidationError(format!(
            "Invalid year filter '{}': expected '{}' or a four-digit year",
            s, ALL_YEARS_LABEL
        )))
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
