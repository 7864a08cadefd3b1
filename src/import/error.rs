use derive_more::Display;

use crate::store::StoreError;

/// Rejected template edit.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TemplateError {
    #[display(fmt = "column key `{}` already exists in the template", _0)]
    DuplicateKey(String),
    #[display(fmt = "`{}` is a required system column and cannot be removed", _0)]
    ProtectedField(String),
    #[display(fmt = "no column with key `{}`", _0)]
    UnknownColumn(String),
    #[display(fmt = "column name must contain at least one letter or digit")]
    InvalidName,
    #[display(
        fmt = "`{}` is a system column; only its display name and position can change",
        _0
    )]
    SystemColumnChanged(String),
}

impl std::error::Error for TemplateError {}

/// Failure that stops a whole batch before any row is looked at.
#[derive(Debug, Display)]
pub enum BatchError {
    #[display(fmt = "File is empty or missing headers")]
    EmptyGrid,
    #[display(fmt = "File has a header row but no data rows")]
    MissingDataRows,
    #[display(
        fmt = "None of the required columns were found in the header row (expected one of: {})",
        expected
    )]
    NoRequiredHeaders { expected: String },
    #[display(fmt = "Payrun data already exists for {}", _0)]
    PeriodAlreadyImported(String),
    #[display(fmt = "Invalid payrun period: {}", _0)]
    InvalidPeriod(String),
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for BatchError {}

impl From<StoreError> for BatchError {
    fn from(err: StoreError) -> Self {
        BatchError::Store(err)
    }
}
