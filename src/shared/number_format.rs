//! Regional number formatting: `.` groups thousands, `,` separates decimals.
//!
//! Both functions are total: missing, non-numeric and non-finite input render
//! as zero (`"0"` / `"0,00"`), never as an error.

use crate::domain::record::CellValue;

/// A number ready to format, or nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i128),
    Float(f64),
}

/// Anything the dashboard may hand to the formatters.
pub trait ToNumeric {
    fn to_numeric(&self) -> Option<Numeric>;
}

impl ToNumeric for i64 {
    fn to_numeric(&self) -> Option<Numeric> {
        Some(Numeric::Int(*self as i128))
    }
}

impl ToNumeric for u64 {
    fn to_numeric(&self) -> Option<Numeric> {
        Some(Numeric::Int(*self as i128))
    }
}

impl ToNumeric for usize {
    fn to_numeric(&self) -> Option<Numeric> {
        Some(Numeric::Int(*self as i128))
    }
}

impl ToNumeric for f64 {
    fn to_numeric(&self) -> Option<Numeric> {
        self.is_finite().then_some(Numeric::Float(*self))
    }
}

impl ToNumeric for str {
    fn to_numeric(&self) -> Option<Numeric> {
        let trimmed = self.trim();
        if let Ok(i) = trimmed.parse::<i128>() {
            return Some(Numeric::Int(i));
        }
        trimmed.parse::<f64>().ok().and_then(|f| f.to_numeric())
    }
}

impl ToNumeric for String {
    fn to_numeric(&self) -> Option<Numeric> {
        self.as_str().to_numeric()
    }
}

impl ToNumeric for CellValue {
    fn to_numeric(&self) -> Option<Numeric> {
        match self {
            CellValue::Integer(i) => i.to_numeric(),
            CellValue::Real(f) => f.to_numeric(),
            CellValue::Text(s) => s.to_numeric(),
            CellValue::Bool(b) => Some(Numeric::Int(*b as i128)),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }
}

impl<T: ToNumeric + ?Sized> ToNumeric for &T {
    fn to_numeric(&self) -> Option<Numeric> {
        (**self).to_numeric()
    }
}

impl<T: ToNumeric> ToNumeric for Option<T> {
    fn to_numeric(&self) -> Option<Numeric> {
        self.as_ref().and_then(|v| v.to_numeric())
    }
}

/// Truncate to an integer and group thousands with `.`.
///
/// `format_integer(1234567_i64) == "1.234.567"`
pub fn format_integer<T: ToNumeric + ?Sized>(value: &T) -> String {
    match value.to_numeric() {
        Some(Numeric::Int(i)) => group_digits(&i.to_string()),
        Some(Numeric::Float(f)) => match f.trunc() {
            // Covers -0.0 as well, so small negatives render unsigned.
            whole if whole == 0.0 => "0".to_string(),
            whole => group_digits(&format!("{:.0}", whole)),
        },
        None => "0".to_string(),
    }
}

/// Two decimals, `,` as decimal separator and `.` grouping thousands.
///
/// `format_decimal(&1234.5) == "1.234,50"`
pub fn format_decimal<T: ToNumeric + ?Sized>(value: &T) -> String {
    let number = match value.to_numeric() {
        Some(Numeric::Int(i)) => i as f64,
        Some(Numeric::Float(f)) => f,
        None => return "0,00".to_string(),
    };

    let rendered = format!("{:.2}", number);
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    format!("{},{}", group_digits(int_part), frac_part)
}

/// Percentage as shown on the dashboard, e.g. `"20,00%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_decimal(&value))
}

fn group_digits(digits: &str) -> String {
    let (sign, body) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let len = body.len();
    let mut grouped = String::with_capacity(len + len / 3 + 1);
    grouped.push_str(sign);
    for (idx, ch) in body.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
