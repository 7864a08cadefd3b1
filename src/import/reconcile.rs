//! Turns an uploaded grid into accepted rows and per-row errors.
//!
//! Row pipeline: resolve headers, normalize cells, validate, then match the
//! employee identifier against the directory snapshot and earlier rows of the
//! same upload. A row failing any stage is rejected with every message
//! collected so far and never reaches the later stages. Nothing a single row
//! does can abort the batch.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::import::error::BatchError;
use crate::import::header::{ColumnIndex, resolve_headers};
use crate::import::normalize::{Normalized, normalize_cell};
use crate::import::rules::rules_for;
use crate::import::validate::RowValidator;
use crate::model::employee::Employee;
use crate::model::import::{
    CellValue, FailureKind, ImportError, ImportSummary, RawRow, ReconciledRow, TypedValue,
};
use crate::model::template::{ImportDomain, TemplateColumn};

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    pub domain: ImportDomain,
    pub today: NaiveDate,
    pub min_age: u32,
    pub batch_id: Uuid,
}

/// Identifier comparison key: trimmed and case-insensitive.
fn id_key(id: &str) -> String {
    id.trim().to_lowercase()
}

struct Directory<'a> {
    by_code: HashMap<String, Vec<&'a Employee>>,
}

impl<'a> Directory<'a> {
    fn new(employees: &'a [Employee]) -> Self {
        let mut by_code: HashMap<String, Vec<&'a Employee>> = HashMap::new();
        for employee in employees {
            by_code
                .entry(id_key(&employee.employee_code))
                .or_default()
                .push(employee);
        }
        Self { by_code }
    }

    fn matches(&self, id: &str) -> &[&'a Employee] {
        self.by_code.get(&id_key(id)).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn header_is_blank(row: &[CellValue]) -> bool {
    row.iter()
        .all(|c| c.as_header_text().is_none_or(|t| t.trim().is_empty()))
}

fn check_structure(
    grid: &[Vec<CellValue>],
    columns: &[TemplateColumn],
) -> Result<ColumnIndex, BatchError> {
    let header = match grid.first() {
        Some(row) if !header_is_blank(row) => row,
        _ => return Err(BatchError::EmptyGrid),
    };
    let has_data = grid[1..]
        .iter()
        .any(|cells| !cells.iter().all(CellValue::is_blank));
    if !has_data {
        return Err(BatchError::MissingDataRows);
    }

    let index = resolve_headers(header, columns);
    let required: Vec<&TemplateColumn> = columns.iter().filter(|c| c.required).collect();
    if !required.is_empty() && !required.iter().any(|c| index.is_resolved(&c.key)) {
        let expected = required
            .iter()
            .map(|c| c.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(BatchError::NoRequiredHeaders { expected });
    }
    Ok(index)
}

/// Reconciles every data row of `grid` (row 0 is the header row).
///
/// `directory` is the company's employee list, read once by the caller before
/// the batch starts.
pub fn reconcile_batch(
    grid: &[Vec<CellValue>],
    columns: &[TemplateColumn],
    directory: &[Employee],
    options: &ReconcileOptions,
) -> Result<ImportSummary<ReconciledRow>, BatchError> {
    let index = check_structure(grid, columns)?;
    let directory = Directory::new(directory);
    let validator = RowValidator::new(options.today, options.min_age);
    let mut summary = ImportSummary::new(options.batch_id);
    summary.set_unresolved_columns(index.unresolved());

    // identifier -> first accepted row carrying it
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, cells) in grid.iter().enumerate().skip(1) {
        let row = RawRow {
            cells,
            source_row_number: i + 1,
        };
        if row.is_blank() {
            continue;
        }
        match reconcile_row(&row, columns, &index, &validator, options.domain) {
            Err(error) => summary.reject(error),
            Ok(mut reconciled) => {
                let mut error =
                    ImportError::new(row.source_row_number, Some(reconciled.employee_id.clone()));
                let key = id_key(&reconciled.employee_id);

                if let Some(first) = seen.get(&key) {
                    error.push(
                        FailureKind::DuplicateEmployee,
                        format!(
                            "Employee ID {} already appears in row {}",
                            reconciled.employee_id, first
                        ),
                    );
                }

                let matches = directory.matches(&reconciled.employee_id);
                match (options.domain, matches) {
                    (ImportDomain::Payrun, []) => error.push(
                        FailureKind::EmployeeNotFound,
                        format!("Employee ID {} not found", reconciled.employee_id),
                    ),
                    (ImportDomain::Payrun, [employee]) => {
                        reconciled.internal_id = Some(employee.id);
                        reconciled.name = Some(employee.name.clone());
                    }
                    (ImportDomain::Payrun, many) => error.push(
                        FailureKind::DuplicateEmployee,
                        format!(
                            "Employee ID {} matches {} employees",
                            reconciled.employee_id,
                            many.len()
                        ),
                    ),
                    (ImportDomain::Employee, []) => {}
                    (ImportDomain::Employee, _) => error.push(
                        FailureKind::DuplicateEmployee,
                        format!("Employee ID {} already exists", reconciled.employee_id),
                    ),
                }

                if error.is_empty() {
                    seen.insert(key, row.source_row_number);
                    summary.accept(reconciled);
                } else {
                    summary.reject(error);
                }
            }
        }
    }

    debug!(
        batch_id = %options.batch_id,
        domain = %options.domain,
        accepted = summary.success().len(),
        rejected = summary.errors().len(),
        "batch reconciled"
    );
    Ok(summary)
}

/// Headers, normalization and validation of one row. The directory is not
/// consulted here.
fn reconcile_row(
    row: &RawRow<'_>,
    columns: &[TemplateColumn],
    index: &ColumnIndex,
    validator: &RowValidator,
    domain: ImportDomain,
) -> Result<ReconciledRow, ImportError> {
    let id_column = domain.identifier_key();
    let mut values: Vec<(&TemplateColumn, Normalized)> = Vec::with_capacity(columns.len());
    let mut missing_headers: Vec<&TemplateColumn> = Vec::new();

    for column in columns {
        match index.position(&column.key) {
            Some(pos) => {
                let uppercase = rules_for(&column.key).uppercase;
                values.push((column, normalize_cell(row.cell(pos), column.value_type, uppercase)));
            }
            None if column.required => missing_headers.push(column),
            None => {}
        }
    }

    let employee_id = values
        .iter()
        .find(|(c, _)| c.key == id_column)
        .and_then(|(_, v)| v.value())
        .map(TypedValue::to_canonical_string);

    let mut error = ImportError::new(row.source_row_number, employee_id.clone());
    for column in missing_headers {
        error.push(
            FailureKind::HeaderUnresolved,
            format!(
                "column \"{}\" ({}) was not found in the header row",
                column.display_name, column.key
            ),
        );
    }
    for violation in validator.validate_row(&values) {
        error.push(violation.kind, violation.message);
    }
    let employee_id = match employee_id {
        Some(id) => id,
        None => {
            // Only reached when the identifier column is optional or absent from
            // the template; a required one was already reported.
            if !error.has_kind(FailureKind::FieldRequired)
                && !error.has_kind(FailureKind::HeaderUnresolved)
            {
                error.push(FailureKind::FieldRequired, format!("{id_column} is required"));
            }
            return Err(error);
        }
    };
    if !error.is_empty() {
        return Err(error);
    }

    let fields: BTreeMap<String, TypedValue> = values
        .into_iter()
        .filter(|(c, _)| c.key != id_column)
        .filter_map(|(c, v)| match v {
            Normalized::Value(v) => Some((c.key.clone(), v)),
            _ => None,
        })
        .collect();
    let name = match domain {
        ImportDomain::Employee => fields.get("name").and_then(TypedValue::as_str).map(String::from),
        ImportDomain::Payrun => None,
    };

    Ok(ReconciledRow {
        employee_id,
        internal_id: None,
        name,
        fields,
        source_row_number: row.source_row_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::template::default_template;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn options(domain: ImportDomain) -> ReconcileOptions {
        ReconcileOptions {
            domain,
            today: today(),
            min_age: 18,
            batch_id: Uuid::new_v4(),
        }
    }

    fn employee(id: u64, code: &str, name: &str) -> Employee {
        Employee {
            id,
            company_id: 1,
            employee_code: code.to_string(),
            name: name.to_string(),
            fixed_stipend: 25000.0,
            special_allowance: 0.0,
            ot_rate_per_hour: None,
            transport_allowance: 0.0,
            canteen_allowance: 0.0,
            canteen_deduction: 0.0,
            management_fee: 0.0,
            insurance: 0.0,
            pf_enrolled: false,
            esi_enrolled: false,
            status: "active".to_string(),
        }
    }

    fn directory() -> Vec<Employee> {
        vec![
            employee(1, "EMP1001", "John Doe"),
            employee(2, "EMP1002", "Asha Rao"),
            employee(3, "EMP1003", "Ravi Kumar"),
            employee(4, "EMP1004", "Meena S"),
            employee(5, "EMP1005", "Arjun P"),
        ]
    }

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|c| if c.is_empty() { CellValue::Empty } else { CellValue::from(*c) })
            .collect()
    }

    fn payrun(grid: Vec<Vec<CellValue>>) -> Result<ImportSummary<ReconciledRow>, BatchError> {
        reconcile_batch(
            &grid,
            &default_template(ImportDomain::Payrun),
            &directory(),
            &options(ImportDomain::Payrun),
        )
    }

    #[test]
    fn test_minimal_row_is_accepted() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            row(&["EMP1001", "22"]),
        ])
        .unwrap();
        assert_eq!(summary.total_processed(), 1);
        assert!(summary.errors().is_empty());
        let accepted = &summary.success()[0];
        assert_eq!(accepted.employee_id, "EMP1001");
        assert_eq!(accepted.fields.len(), 1);
        assert_eq!(accepted.fields["presentDays"], TypedValue::Number(22.0));
        assert_eq!(accepted.internal_id, Some(1));
        assert_eq!(accepted.name.as_deref(), Some("John Doe"));
        assert_eq!(accepted.source_row_number, 2);
        assert!(summary.unresolved_columns().contains(&"otHours".to_string()));
    }

    #[test]
    fn test_missing_required_value() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            row(&["EMP1001", ""]),
        ])
        .unwrap();
        assert!(summary.success().is_empty());
        let err = &summary.errors()[0];
        assert_eq!(err.source_row_number, 2);
        assert_eq!(err.employee_id.as_deref(), Some("EMP1001"));
        assert_eq!(err.messages, vec!["Row 2: presentDays is required".to_string()]);
        assert_eq!(err.kinds, vec![FailureKind::FieldRequired]);
    }

    #[test]
    fn test_batch_continues_past_bad_row() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            row(&["EMP1001", "22"]),
            row(&["EMP1002", "20"]),
            row(&["EMP1003", "many"]),
            row(&["EMP1004", "21"]),
            row(&["EMP1005", "19"]),
        ])
        .unwrap();
        assert_eq!(summary.total_processed(), 5);
        assert_eq!(summary.success().len(), 4);
        assert_eq!(summary.errors().len(), 1);
        assert_eq!(summary.errors()[0].source_row_number, 4);
        assert_eq!(summary.errors()[0].kinds, vec![FailureKind::FieldTypeInvalid]);
    }

    #[test]
    fn test_header_order_does_not_change_outcome() {
        let a = payrun(vec![
            row(&["Employee ID", "Present Days", "OT Hours"]),
            row(&["EMP1001", "22", "4"]),
            row(&["EMP1002", "x", "1"]),
        ])
        .unwrap();
        let b = payrun(vec![
            row(&["OT Hours", "Present Days", "Employee ID"]),
            row(&["4", "22", "EMP1001"]),
            row(&["1", "x", "EMP1002"]),
        ])
        .unwrap();
        assert_eq!(a.success(), b.success());
        assert_eq!(a.errors(), b.errors());
    }

    #[test]
    fn test_invalid_rows_never_partially_accepted() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days", "Holidays", "OT Hours"]),
            row(&["EMP1001", "22", "-2", "3"]),
        ])
        .unwrap();
        assert!(summary.success().is_empty());
        assert_eq!(summary.errors()[0].kinds, vec![FailureKind::FieldOutOfRange]);
    }

    #[test]
    fn test_unknown_and_ambiguous_employees() {
        let mut dir = directory();
        dir.push(employee(9, "emp1002 ", "Asha R"));
        let summary = reconcile_batch(
            &[
                row(&["Employee ID", "Present Days"]),
                row(&["EMP9999", "22"]),
                row(&["EMP1002", "22"]),
                row(&["emp1003", "22"]),
            ],
            &default_template(ImportDomain::Payrun),
            &dir,
            &options(ImportDomain::Payrun),
        )
        .unwrap();
        assert_eq!(summary.errors()[0].kinds, vec![FailureKind::EmployeeNotFound]);
        assert_eq!(summary.errors()[1].kinds, vec![FailureKind::DuplicateEmployee]);
        assert_eq!(summary.success()[0].internal_id, Some(3));
    }

    #[test]
    fn test_repeated_identifier_in_one_upload() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            row(&["EMP1001", "22"]),
            row(&["emp1001", "20"]),
        ])
        .unwrap();
        assert_eq!(summary.success().len(), 1);
        let err = &summary.errors()[0];
        assert_eq!(err.source_row_number, 3);
        assert_eq!(err.kinds, vec![FailureKind::DuplicateEmployee]);
        assert!(err.messages[0].contains("row 2"));
    }

    #[test]
    fn test_repeated_unknown_identifier_reports_not_found_only() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            row(&["EMP9999", "22"]),
            row(&["EMP9999", "20"]),
            row(&["EMP1001", ""]),
            row(&["EMP1001", "21"]),
        ])
        .unwrap();
        assert_eq!(summary.total_processed(), 4);
        for err in &summary.errors()[..2] {
            assert_eq!(err.kinds, vec![FailureKind::EmployeeNotFound]);
            assert_eq!(err.messages.len(), 1);
        }
        assert_eq!(summary.errors()[2].source_row_number, 4);
        assert_eq!(summary.errors()[2].kinds, vec![FailureKind::FieldRequired]);
        assert_eq!(summary.success()[0].source_row_number, 5);
    }

    #[test]
    fn test_falsy_rows_are_skipped() {
        let summary = payrun(vec![
            row(&["Employee ID", "Present Days"]),
            vec![CellValue::Empty, CellValue::Number(0.0)],
            row(&["EMP1001", "22"]),
            vec![CellValue::from("  "), CellValue::Bool(false)],
        ])
        .unwrap();
        assert_eq!(summary.total_processed(), 1);
        assert_eq!(summary.success()[0].source_row_number, 3);
    }

    #[test]
    fn test_structural_failures() {
        assert!(matches!(payrun(vec![]), Err(BatchError::EmptyGrid)));
        assert!(matches!(
            payrun(vec![row(&["", ""]), row(&["EMP1001", "22"])]),
            Err(BatchError::EmptyGrid)
        ));
        assert!(matches!(
            payrun(vec![row(&["Employee ID", "Present Days"]), row(&["", ""])]),
            Err(BatchError::MissingDataRows)
        ));
        assert!(matches!(
            payrun(vec![row(&["Foo", "Bar"]), row(&["EMP1001", "22"])]),
            Err(BatchError::NoRequiredHeaders { .. })
        ));
    }

    #[test]
    fn test_unresolved_required_header_rejects_rows() {
        let summary = payrun(vec![row(&["Employee ID", "Holidays"]), row(&["EMP1001", "2"])]).unwrap();
        let err = &summary.errors()[0];
        assert_eq!(err.kinds, vec![FailureKind::HeaderUnresolved]);
        assert!(err.messages[0].contains("presentDays"));
    }

    #[test]
    fn test_employee_domain_rejects_existing_ids() {
        let columns: Vec<TemplateColumn> = default_template(ImportDomain::Employee)
            .into_iter()
            .map(|mut c| {
                c.required = matches!(c.key.as_str(), "empIdNo" | "name");
                c
            })
            .collect();
        let summary = reconcile_batch(
            &[
                row(&["Employee ID", "Full Name", "PAN Number"]),
                row(&["EMP1001", "John Doe", ""]),
                row(&["EMP2001", "New Hire", "abcde1234f"]),
            ],
            &columns,
            &directory(),
            &options(ImportDomain::Employee),
        )
        .unwrap();
        assert_eq!(summary.errors()[0].kinds, vec![FailureKind::DuplicateEmployee]);
        let accepted = &summary.success()[0];
        assert_eq!(accepted.employee_id, "EMP2001");
        assert_eq!(accepted.name.as_deref(), Some("New Hire"));
        assert_eq!(accepted.text("panNumber"), Some("ABCDE1234F"));
        assert!(!accepted.fields.contains_key("empIdNo"));
    }
}
