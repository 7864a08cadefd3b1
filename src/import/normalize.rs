//! Raw cell → typed value. Every function here is pure and total: bad input
//! comes back as [`Normalized::Invalid`], never as a panic or a silent default.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::model::import::{CellValue, TypedValue};
use crate::model::template::ValueType;

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Empty,
    /// Present but unusable for the column type; carries the raw text
    Invalid(String),
    Value(TypedValue),
}

impl Normalized {
    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            Normalized::Value(v) => Some(v),
            _ => None,
        }
    }
}

fn raw_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

pub fn normalize_cell(cell: &CellValue, value_type: ValueType, uppercase: bool) -> Normalized {
    match value_type {
        ValueType::String => normalize_text(cell, uppercase, TypedValue::Text),
        ValueType::Enum => normalize_text(cell, uppercase, TypedValue::Enum),
        ValueType::Number => normalize_number(cell),
        ValueType::Date => normalize_date(cell),
    }
}

fn normalize_text(
    cell: &CellValue,
    uppercase: bool,
    wrap: fn(String) -> TypedValue,
) -> Normalized {
    if let CellValue::Number(n) = cell {
        if !n.is_finite() {
            return Normalized::Invalid(n.to_string());
        }
    }
    let text = raw_text(cell);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Normalized::Empty;
    }
    let value = if uppercase {
        trimmed.to_uppercase()
    } else {
        trimmed.to_string()
    };
    Normalized::Value(wrap(value))
}

/// Parses amounts as they show up in payroll sheets: `₹25,000`, `Rs. 1200`,
/// `(500)` for a negative.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .trim()
        .replace("Rs.", "")
        .replace("INR", "")
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$') && !c.is_whitespace())
        .collect();
    let negative = s.starts_with('(') && s.ends_with(')');
    if negative {
        s = s[1..s.len() - 1].to_string();
    }
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn normalize_number(cell: &CellValue) -> Normalized {
    match cell {
        CellValue::Empty => Normalized::Empty,
        CellValue::Number(n) if n.is_finite() => Normalized::Value(TypedValue::Number(*n)),
        CellValue::Text(s) if s.trim().is_empty() => Normalized::Empty,
        CellValue::Text(s) => match parse_amount(s) {
            Some(n) => Normalized::Value(TypedValue::Number(n)),
            None => Normalized::Invalid(s.trim().to_string()),
        },
        other => Normalized::Invalid(raw_text(other)),
    }
}

/// Spreadsheet serial → calendar date, replicating the 1900 leap-year bug:
/// day 1 is 1900-01-01 and serials above 59 are shifted back one day for the
/// non-existent 1900-02-29. The time-of-day fraction is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let day = serial.floor();
    // 9999-12-31
    if day > 2_958_465.0 {
        return None;
    }
    let day = day as u64;
    let offset = if day > 59 { day - 1 } else { day };
    NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(offset))
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y", "%d %B %Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Date part of an ISO-style date or date-time string, as written.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    let s = s.trim_end_matches('Z');
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.date())
}

fn normalize_date(cell: &CellValue) -> Normalized {
    let parsed = match cell {
        CellValue::Empty => return Normalized::Empty,
        CellValue::Text(s) if s.trim().is_empty() => return Normalized::Empty,
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(serial) => serial_to_date(serial),
            Err(_) => parse_date_text(s),
        },
        CellValue::Bool(_) => None,
    };
    match parsed {
        Some(date) => Normalized::Value(TypedValue::Date(date)),
        None => Normalized::Invalid(raw_text(cell).trim().to_string()),
    }
}
