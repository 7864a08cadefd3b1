use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;
use uuid::Uuid;

/// One untyped spreadsheet cell as handed over by the sheet extractor.
///
/// JSON form is untagged: `null`, `true`, `12.5` or `"text"`. `Date` only comes
/// from extractors that already hold a native date; from JSON a date arrives as
/// text or as a serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl CellValue {
    /// Mirrors spreadsheet "falsy": empty, blank text, zero and `false`.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Bool(b) => !b,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Date(_) => false,
        }
    }

    /// Header cells may be typed as numbers by the extractor.
    pub fn as_header_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    /// Serializes as `YYYY-MM-DD`
    Date(NaiveDate),
    Enum(String),
}

impl TypedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) | TypedValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical text form, the same one the value serializes to.
    pub fn to_canonical_string(&self) -> String {
        match self {
            TypedValue::Text(s) | TypedValue::Enum(s) => s.clone(),
            TypedValue::Number(n) => n.to_string(),
            TypedValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Data row of the grid plus its 1-based line number in the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow<'a> {
    pub cells: &'a [CellValue],
    pub source_row_number: usize,
}

impl RawRow<'_> {
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRow {
    pub employee_id: String,
    /// Internal id of the matched directory entry, when the domain matches one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: BTreeMap<String, TypedValue>,
    pub source_row_number: usize,
}

impl ReconciledRow {
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(TypedValue::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(TypedValue::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display, AsRefStr)]
pub enum FailureKind {
    HeaderUnresolved,
    FieldRequired,
    FieldTypeInvalid,
    FieldPatternInvalid,
    FieldOutOfRange,
    FieldBelowMinimumAge,
    EmployeeNotFound,
    DuplicateEmployee,
    PersistenceFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    pub source_row_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub messages: Vec<String>,
    pub kinds: Vec<FailureKind>,
}

impl ImportError {
    pub fn new(source_row_number: usize, employee_id: Option<String>) -> Self {
        Self {
            source_row_number,
            employee_id,
            messages: Vec::new(),
            kinds: Vec::new(),
        }
    }

    pub fn single(
        source_row_number: usize,
        employee_id: Option<String>,
        kind: FailureKind,
        message: impl std::fmt::Display,
    ) -> Self {
        let mut err = Self::new(source_row_number, employee_id);
        err.push(kind, message);
        err
    }

    /// Messages are prefixed with the row so they read well in a flat list.
    pub fn push(&mut self, kind: FailureKind, message: impl std::fmt::Display) {
        self.messages
            .push(format!("Row {}: {}", self.source_row_number, message));
        self.kinds.push(kind);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_kind(&self, kind: FailureKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Partitioned outcome of one import batch.
///
/// `total_processed` always equals `success.len() + errors.len()`; the fields
/// are only reachable through methods that keep it so.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary<T> {
    batch_id: Uuid,
    success: Vec<T>,
    errors: Vec<ImportError>,
    total_processed: usize,
    unresolved_columns: Vec<String>,
}

impl<T> ImportSummary<T> {
    pub fn new(batch_id: Uuid) -> Self {
        Self {
            batch_id,
            success: Vec::new(),
            errors: Vec::new(),
            total_processed: 0,
            unresolved_columns: Vec::new(),
        }
    }

    pub fn accept(&mut self, item: T) {
        self.success.push(item);
        self.total_processed += 1;
    }

    pub fn reject(&mut self, error: ImportError) {
        self.errors.push(error);
        self.total_processed += 1;
    }

    pub fn set_unresolved_columns(&mut self, keys: Vec<String>) {
        self.unresolved_columns = keys;
    }

    pub fn success(&self) -> &[T] {
        &self.success
    }

    pub fn errors(&self) -> &[ImportError] {
        &self.errors
    }

    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    pub fn unresolved_columns(&self) -> &[String] {
        &self.unresolved_columns
    }

    /// Takes the accepted rows out for a further per-row stage. The returned
    /// summary keeps the errors so far; the caller re-accepts or rejects every
    /// taken row.
    pub fn take_success<U>(self) -> (Vec<T>, ImportSummary<U>) {
        let carried = ImportSummary {
            batch_id: self.batch_id,
            success: Vec::new(),
            total_processed: self.errors.len(),
            errors: self.errors,
            unresolved_columns: self.unresolved_columns,
        };
        (self.success, carried)
    }

    /// Orders errors by source row once all stages have run.
    pub fn finish(mut self) -> Self {
        self.errors.sort_by_key(|e| e.source_row_number);
        self
    }
}
