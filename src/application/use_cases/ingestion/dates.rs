use crate::domain::record::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

// Month-first wins when both readings are valid.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Coerce a date-column cell; anything that is not a recognizable date becomes NULL.
pub fn coerce_date(value: &CellValue) -> CellValue {
    match value {
        CellValue::Date(dt) => CellValue::Date(*dt),
        CellValue::Text(text) => parse_date_text(text)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        _ => CellValue::Null,
    }
}

pub fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parses_common_layouts() {
        assert_eq!(parse_date_text("2023-04-05"), Some(ymd(2023, 4, 5)));
        assert_eq!(parse_date_text("2023/04/05"), Some(ymd(2023, 4, 5)));
        assert_eq!(parse_date_text("25/12/2022"), Some(ymd(2022, 12, 25)));
        assert_eq!(parse_date_text("25-12-2022"), Some(ymd(2022, 12, 25)));
        assert_eq!(
            parse_date_text("2023-04-05 14:30"),
            NaiveDate::from_ymd_opt(2023, 4, 5).unwrap().and_hms_opt(14, 30, 0)
        );
        assert_eq!(
            parse_date_text("2023-04-05T08:00:00-04:00"),
            NaiveDate::from_ymd_opt(2023, 4, 5).unwrap().and_hms_opt(8, 0, 0)
        );
    }

    #[test]
    fn test_ambiguous_day_month_reads_month_first() {
        assert_eq!(parse_date_text("03/04/2023"), Some(ymd(2023, 3, 4)));
    }

    #[test]
    fn test_unparseable_becomes_null() {
        assert_eq!(coerce_date(&CellValue::Text("pendiente".to_string())), CellValue::Null);
        assert_eq!(coerce_date(&CellValue::Text("31/02/2023".to_string())), CellValue::Null);
        assert_eq!(coerce_date(&CellValue::Integer(20230101)), CellValue::Null);
        assert_eq!(coerce_date(&CellValue::Null), CellValue::Null);
    }

    #[test]
    fn test_spreadsheet_dates_pass_through() {
        let dt = ymd(2021, 1, 31);
        assert_eq!(coerce_date(&CellValue::Date(dt)), CellValue::Date(dt));
    }
}
