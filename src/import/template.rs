//! Column templates: the built-in defaults per import domain and the edits a
//! company may make to them.

use crate::import::error::TemplateError;
use crate::import::header::normalize_header;
use crate::model::import::CellValue;
use crate::model::template::{
    CUSTOM_KEY_PREFIX, CUSTOM_SYSTEM_LABEL, ImportDomain, TemplateColumn, ValueType,
};

pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"];

fn employee_defaults() -> Vec<TemplateColumn> {
    use ValueType::{Date, Number, String as Text};
    let col = TemplateColumn::system;
    vec![
        col("empIdNo", "Employee ID", true, Text),
        col("name", "Full Name", true, Text),
        col("dateOfJoining", "Date of Joining", true, Date),
        col("department", "Department", true, Text),
        col("designation", "Designation", true, Text),
        col("gender", "Gender", true, Text),
        col("fixedStipend", "Fixed Stipend", true, Number),
        col("fatherName", "Father's Name", true, Text),
        col("permanentAddress", "Permanent Address", true, Text),
        col("communicationAddress", "Communication Address", true, Text),
        col("contactNumber", "Contact Number", true, Text),
        col("emergencyContactNumber", "Emergency Contact", true, Text),
        col("qualification", "Qualification", true, Text),
        col("qualificationTrade", "Qualification Trade", false, Text),
        col("bloodGroup", "Blood Group", true, Text).with_enum_values(&BLOOD_GROUPS),
        col("adharNumber", "Aadhar Number", true, Text),
        col("panNumber", "PAN Number", true, Text),
        col("bankName", "Bank Name", true, Text),
        col("accountNumber", "Account Number", true, Text),
        col("ifscCode", "IFSC Code", true, Text),
        col("branch", "Branch", true, Text),
        col("category", "Category", true, Text),
        col("DOB", "Date of Birth", true, Date),
        col("salaryType", "Salary Type", true, Text).with_enum_values(&["Wages", "Salary"]),
        col("employeeCategory", "Employee Category", true, Text),
    ]
}

fn payrun_defaults() -> Vec<TemplateColumn> {
    use ValueType::{Number, String as Text};
    let col = TemplateColumn::system;
    vec![
        col("empId", "Employee ID", true, Text),
        col("name", "Trainee Name", false, Text),
        col("presentDays", "Present Days", true, Number),
        col("holidays", "Holidays", false, Number),
        col("otHours", "OT Hours", false, Number),
        col("totalFixedDays", "Total Fixed Days", false, Number),
        col("lopDays", "LOP Days", false, Number),
        col("transport", "Transport", false, Number),
        col("canteen", "Canteen", false, Number),
        col("remarks", "Remarks", false, Text),
    ]
}

/// Built-in ordered column set of a domain.
pub fn default_template(domain: ImportDomain) -> Vec<TemplateColumn> {
    match domain {
        ImportDomain::Employee => employee_defaults(),
        ImportDomain::Payrun => payrun_defaults(),
    }
}

/// Saved columns in their persisted order, followed by every default column
/// the saved list lacks, in default order.
pub fn merge_with_saved(
    defaults: &[TemplateColumn],
    saved: Vec<TemplateColumn>,
) -> Vec<TemplateColumn> {
    let mut merged = saved;
    let missing: Vec<TemplateColumn> = defaults
        .iter()
        .filter(|d| !merged.iter().any(|c| c.key == d.key))
        .cloned()
        .collect();
    merged.extend(missing);
    merged
}

/// `custom_` key for a user supplied header name, `None` when nothing usable
/// remains after normalization.
pub fn custom_key_for(display_name: &str) -> Option<String> {
    let mut slug = String::new();
    let mut pending_sep = false;
    for ch in display_name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            pending_sep = !slug.is_empty();
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_sep {
                slug.push('_');
                pending_sep = false;
            }
            slug.push(ch);
        }
    }
    let slug = slug.trim_matches('_');
    if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        Some(format!("{CUSTOM_KEY_PREFIX}{slug}"))
    } else {
        None
    }
}

fn clashes(columns: &[TemplateColumn], key: &str) -> bool {
    let wanted = normalize_header(key);
    columns.iter().any(|c| normalize_header(&c.key) == wanted)
}

fn position(columns: &[TemplateColumn], key: &str) -> Result<usize, TemplateError> {
    columns
        .iter()
        .position(|c| c.key == key)
        .ok_or_else(|| TemplateError::UnknownColumn(key.to_string()))
}

/// Appends an optional free-text column and returns its generated key.
pub fn add_custom_column(
    columns: &mut Vec<TemplateColumn>,
    display_name: &str,
) -> Result<String, TemplateError> {
    let key = custom_key_for(display_name).ok_or(TemplateError::InvalidName)?;
    if clashes(columns, &key) {
        return Err(TemplateError::DuplicateKey(key));
    }
    columns.push(TemplateColumn {
        key: key.clone(),
        display_name: display_name.trim().to_string(),
        system_label: CUSTOM_SYSTEM_LABEL.to_string(),
        required: false,
        value_type: ValueType::String,
        enum_values: None,
    });
    Ok(key)
}

/// Re-adds a default column of `domain` that was removed earlier.
pub fn add_system_column(
    columns: &mut Vec<TemplateColumn>,
    domain: ImportDomain,
    key: &str,
) -> Result<(), TemplateError> {
    let column = default_template(domain)
        .into_iter()
        .find(|c| c.key == key)
        .ok_or_else(|| TemplateError::UnknownColumn(key.to_string()))?;
    if clashes(columns, key) {
        return Err(TemplateError::DuplicateKey(key.to_string()));
    }
    columns.push(column);
    Ok(())
}

pub fn remove_column(
    columns: &mut Vec<TemplateColumn>,
    key: &str,
) -> Result<TemplateColumn, TemplateError> {
    let idx = position(columns, key)?;
    let column = &columns[idx];
    if column.required && !column.is_custom() {
        return Err(TemplateError::ProtectedField(key.to_string()));
    }
    Ok(columns.remove(idx))
}

/// Changes the header text only; `key` and `system_label` stay as they are.
pub fn rename_column(
    columns: &mut [TemplateColumn],
    key: &str,
    new_display_name: &str,
) -> Result<(), TemplateError> {
    let name = new_display_name.trim();
    if normalize_header(name).is_empty() {
        return Err(TemplateError::InvalidName);
    }
    let idx = position(columns, key)?;
    columns[idx].display_name = name.to_string();
    Ok(())
}

/// Checks a whole column list before it is persisted.
///
/// Default columns of `domain` keep their label, type, enum values and
/// required flag; only the display name and order may differ. Any other key
/// must be a custom column.
pub fn check_template(
    domain: ImportDomain,
    columns: &[TemplateColumn],
) -> Result<(), TemplateError> {
    let defaults = default_template(domain);
    for (i, column) in columns.iter().enumerate() {
        if normalize_header(&column.key).is_empty() || normalize_header(&column.display_name).is_empty()
        {
            return Err(TemplateError::InvalidName);
        }
        if clashes(&columns[..i], &column.key) {
            return Err(TemplateError::DuplicateKey(column.key.clone()));
        }
        match defaults.iter().find(|d| d.key == column.key) {
            Some(default) => {
                if column.system_label != default.system_label
                    || column.value_type != default.value_type
                    || column.enum_values != default.enum_values
                    || column.required != default.required
                {
                    return Err(TemplateError::SystemColumnChanged(column.key.clone()));
                }
            }
            None if column.is_custom() => {
                if column.system_label != CUSTOM_SYSTEM_LABEL {
                    return Err(TemplateError::SystemColumnChanged(column.key.clone()));
                }
            }
            None => return Err(TemplateError::UnknownColumn(column.key.clone())),
        }
    }
    Ok(())
}

/// Header row plus one sample data row, for the downloadable template.
pub fn sample_grid(domain: ImportDomain, columns: &[TemplateColumn]) -> Vec<Vec<CellValue>> {
    let header = columns
        .iter()
        .map(|c| CellValue::Text(c.display_name.clone()))
        .collect();
    let sample = columns
        .iter()
        .map(|c| sample_value(domain, c))
        .collect();
    vec![header, sample]
}

fn sample_value(domain: ImportDomain, column: &TemplateColumn) -> CellValue {
    if column.key == domain.identifier_key() {
        return CellValue::from("EMP1001");
    }
    match column.key.as_str() {
        "name" => return CellValue::from("John Doe"),
        "fixedStipend" => return CellValue::Number(25000.0),
        "presentDays" => return CellValue::Number(22.0),
        "DOB" => return CellValue::from("1995-06-15"),
        _ => {}
    }
    match column.value_type {
        ValueType::Date => CellValue::from("2023-01-15"),
        ValueType::Number => CellValue::Number(0.0),
        ValueType::Enum => column
            .enum_values
            .as_ref()
            .and_then(|v| v.first())
            .map(|v| CellValue::Text(v.clone()))
            .unwrap_or(CellValue::Empty),
        ValueType::String => CellValue::from("Sample"),
    }
}
