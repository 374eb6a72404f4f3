//! SQL identifier allow-listing.
//!
//! Table and column names come from configuration and are interpolated into
//! query text, so they must match `^[A-Za-z_][A-Za-z0-9_]*$` and are always
//! emitted double-quoted. Literal values never go through here; they are bound.

use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A table or column name that passed the allow-list pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// `role` only feeds the error message ("table", "date column", ...).
    pub fn parse(role: &str, raw: &str) -> Result<Self> {
        let name = raw.trim();
        if !is_valid_identifier(name) {
            return Err(AppError::ValidationError(format!(
                "Invalid {} name '{}': use letters, digits and underscore, not starting with a digit",
                role, raw
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }

    /// SQLite resolves column names case-insensitively.
    pub fn matches(&self, column: &str) -> bool {
        self.0.eq_ignore_ascii_case(column)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(s)
}

/// Quote any name for SQLite, doubling embedded quotes.
///
/// Used for uploaded header names, which are arbitrary text.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["cedula", "SubCatg1", "_tmp", "consolidado_total"] {
            assert!(Identifier::parse("column", name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let id = Identifier::parse("column", "  estado ").unwrap();
        assert_eq!(id.as_str(), "estado");
    }

    #[test]
    fn test_rejects_injection_attempts() {
        for name in [
            "",
            "1col",
            "fecha\"; DROP TABLE x; --",
            "a b",
            "año",
            "col-name",
        ] {
            let err = Identifier::parse("column", name).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{}", name);
        }
    }

    #[test]
    fn test_quote_identifier_doubles_quotes() {
        assert_eq!(quote_identifier("Fecha Nac"), "\"Fecha Nac\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let id = Identifier::parse("column", "Fecha").unwrap();
        assert!(id.matches("fecha"));
        assert!(!id.matches("fechas"));
    }
}
