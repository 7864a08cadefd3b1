use std::collections::HashMap;

use crate::model::import::CellValue;
use crate::model::template::TemplateColumn;

/// Lower-cases and drops every character that is not a letter or digit, so
/// "Father's Name", "FATHERS NAME" and "fathers_name" compare equal.
#[inline]
pub fn normalize_header(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Where each template column lives in the uploaded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    /// Template order; `None` marks a column whose header was not found
    positions: Vec<(String, Option<usize>)>,
}

impl ColumnIndex {
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, p)| *p)
    }

    pub fn is_resolved(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn unresolved(&self) -> Vec<String> {
        self.positions
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// Maps template columns onto header cells by text only, ignoring column
/// order. Each column tries its display name, then its system label, then its
/// key; the first hit wins and there is no partial matching.
pub fn resolve_headers(header_row: &[CellValue], columns: &[TemplateColumn]) -> ColumnIndex {
    let mut by_text: HashMap<String, usize> = HashMap::new();
    for (idx, cell) in header_row.iter().enumerate() {
        let Some(text) = cell.as_header_text() else {
            continue;
        };
        let normalized = normalize_header(&text);
        if normalized.is_empty() {
            continue;
        }
        // later duplicates win
        by_text.insert(normalized, idx);
    }

    let positions = columns
        .iter()
        .map(|column| {
            let found = [&column.display_name, &column.system_label, &column.key]
                .into_iter()
                .map(|candidate| normalize_header(candidate))
                .filter(|candidate| !candidate.is_empty())
                .find_map(|candidate| by_text.get(&candidate).copied());
            (column.key.clone(), found)
        })
        .collect();

    ColumnIndex { positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::template::default_template;
    use crate::model::template::{ImportDomain, ValueType};

    fn headers(names: &[&str]) -> Vec<CellValue> {
        names.iter().map(|n| CellValue::from(*n)).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Father's Name"), "fathersname");
        assert_eq!(normalize_header("  OT-Hours "), "othours");
        assert_eq!(normalize_header("GST@ 18%"), "gst18");
        assert_eq!(normalize_header("--"), "");
    }

    #[test]
    fn test_display_name_beats_system_label() {
        let mut col = TemplateColumn::system("presentDays", "Present Days", true, ValueType::Number);
        col.display_name = "Days".to_string();
        let index = resolve_headers(&headers(&["Present Days", "days"]), &[col]);
        assert_eq!(index.position("presentDays"), Some(1));
    }

    #[test]
    fn test_falls_back_to_system_label_then_key() {
        let mut col = TemplateColumn::system("presentDays", "Present Days", true, ValueType::Number);
        col.display_name = "Attendance".to_string();
        let by_label = resolve_headers(&headers(&["PRESENT_DAYS"]), &[col.clone()]);
        assert_eq!(by_label.position("presentDays"), Some(0));

        let by_key = resolve_headers(&headers(&["x", "presentdays"]), &[col]);
        assert_eq!(by_key.position("presentDays"), Some(1));
    }

    #[test]
    fn test_near_miss_is_unmatched() {
        let columns = default_template(ImportDomain::Payrun);
        let index = resolve_headers(&headers(&["Employee ID", "Present Day"]), &columns);
        assert_eq!(index.position("empId"), Some(0));
        assert!(!index.is_resolved("presentDays"));
        assert!(index.unresolved().contains(&"presentDays".to_string()));
    }

    #[test]
    fn test_order_does_not_matter() {
        let columns = default_template(ImportDomain::Payrun);
        let a = resolve_headers(&headers(&["Employee ID", "Present Days", "OT Hours"]), &columns);
        let b = resolve_headers(&headers(&["OT Hours", "Employee ID", "Present Days"]), &columns);
        assert_eq!(a.position("empId"), Some(0));
        assert_eq!(b.position("empId"), Some(1));
        assert_eq!(a.unresolved(), b.unresolved());
    }

    #[test]
    fn test_blank_and_numeric_headers() {
        let col = TemplateColumn::system("y2024", "2024", false, ValueType::Number);
        let row = vec![CellValue::Empty, CellValue::from("  "), CellValue::Number(2024.0)];
        let index = resolve_headers(&row, &[col]);
        assert_eq!(index.position("y2024"), Some(2));
    }
}
