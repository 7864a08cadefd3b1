use chrono::{Datelike, NaiveDate};
use derive_more::Display;

use crate::import::normalize::Normalized;
use crate::import::rules::{FieldRules, rules_for};
use crate::model::import::{FailureKind, TypedValue};
use crate::model::template::{TemplateColumn, ValueType};

pub const DEFAULT_MIN_AGE: u32 = 18;

#[derive(Debug, Clone, PartialEq, Display)]
#[display(fmt = "{}", message)]
pub struct Violation {
    pub kind: FailureKind,
    pub message: String,
}

impl Violation {
    fn new(kind: FailureKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Whole years from `born` to `today`, one less while this year's birthday is
/// still ahead. Negative for dates in the future.
pub fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years
}

/// Field and row rules. `today` is fixed at construction so a whole batch is
/// judged against the same date.
#[derive(Debug, Clone, Copy)]
pub struct RowValidator {
    today: NaiveDate,
    min_age: u32,
}

impl RowValidator {
    pub fn new(today: NaiveDate, min_age: u32) -> Self {
        Self { today, min_age }
    }

    /// Every violation of the row; an empty list means the row is valid.
    pub fn validate_row(&self, values: &[(&TemplateColumn, Normalized)]) -> Vec<Violation> {
        let mut violations: Vec<Violation> = values
            .iter()
            .flat_map(|(column, value)| self.validate_field(column, value))
            .collect();
        violations.extend(cross_field(values));
        violations
    }

    pub fn validate_field(&self, column: &TemplateColumn, value: &Normalized) -> Vec<Violation> {
        let key = column.key.as_str();
        let value = match value {
            Normalized::Empty if column.required => {
                return vec![Violation::new(
                    FailureKind::FieldRequired,
                    format!("{key} is required"),
                )];
            }
            Normalized::Empty => return Vec::new(),
            Normalized::Invalid(raw) => {
                return vec![Violation::new(
                    FailureKind::FieldTypeInvalid,
                    format!("{key} must be a valid {}, got \"{raw}\"", column.value_type),
                )];
            }
            Normalized::Value(v) => v,
        };

        let rules = rules_for(key);
        let mut out = Vec::new();
        match value {
            TypedValue::Text(s) | TypedValue::Enum(s) => {
                self.check_text(column, &rules, s, &mut out)
            }
            TypedValue::Number(n) => check_number(key, &rules, *n, &mut out),
            TypedValue::Date(d) => self.check_date(key, &rules, *d, &mut out),
        }
        out
    }

    fn check_text(
        &self,
        column: &TemplateColumn,
        rules: &FieldRules,
        value: &str,
        out: &mut Vec<Violation>,
    ) {
        let key = column.key.as_str();
        if value.chars().count() > rules.max_len {
            out.push(Violation::new(
                FailureKind::FieldOutOfRange,
                format!("{key} must be at most {} characters", rules.max_len),
            ));
        }
        if let Some(pattern) = rules.pattern {
            if !pattern.is_match(value) {
                out.push(Violation::new(
                    FailureKind::FieldPatternInvalid,
                    format!("{key} {}", pattern.message),
                ));
            }
        }

        let allowed: Option<Vec<&str>> = match (&column.enum_values, rules.allowed) {
            (Some(values), _) if column.value_type == ValueType::Enum => {
                Some(values.iter().map(String::as_str).collect())
            }
            (_, Some(values)) => Some(values.to_vec()),
            _ => None,
        };
        if let Some(allowed) = allowed {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
                out.push(Violation::new(
                    FailureKind::FieldPatternInvalid,
                    format!("{key} must be one of: {}", allowed.join(", ")),
                ));
            }
        }
    }

    fn check_date(&self, key: &str, rules: &FieldRules, value: NaiveDate, out: &mut Vec<Violation>) {
        if rules.min_age && age_on(value, self.today) < self.min_age as i32 {
            out.push(Violation::new(
                FailureKind::FieldBelowMinimumAge,
                format!("{key}: employee must be at least {} years old", self.min_age),
            ));
        }
    }
}

fn check_number(key: &str, rules: &FieldRules, value: f64, out: &mut Vec<Violation>) {
    if let Some(min) = rules.min {
        if value < min {
            out.push(Violation::new(
                FailureKind::FieldOutOfRange,
                format!("{key} must be at least {min}"),
            ));
        }
    }
    if let Some(max) = rules.max {
        if value > max {
            out.push(Violation::new(
                FailureKind::FieldOutOfRange,
                format!("{key} must be at most {max}"),
            ));
        }
    }
}

fn text_of<'a>(values: &'a [(&TemplateColumn, Normalized)], key: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|(c, _)| c.key == key)
        .and_then(|(_, v)| v.value())
        .and_then(TypedValue::as_str)
}

fn cross_field(values: &[(&TemplateColumn, Normalized)]) -> Option<Violation> {
    let contact = text_of(values, "contactNumber")?;
    let emergency = text_of(values, "emergencyContactNumber")?;
    (contact == emergency).then(|| {
        Violation::new(
            FailureKind::FieldPatternInvalid,
            "emergencyContactNumber must differ from contactNumber".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::template::default_template;
    use crate::model::template::ImportDomain;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validator() -> RowValidator {
        RowValidator::new(date(2026, 3, 10), DEFAULT_MIN_AGE)
    }

    fn column(domain: ImportDomain, key: &str) -> TemplateColumn {
        default_template(domain)
            .into_iter()
            .find(|c| c.key == key)
            .unwrap()
    }

    fn text(s: &str) -> Normalized {
        Normalized::Value(TypedValue::Text(s.to_string()))
    }

    #[test]
    fn test_required_empty_vs_invalid() {
        let col = column(ImportDomain::Payrun, "presentDays");
        let missing = validator().validate_field(&col, &Normalized::Empty);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].kind, FailureKind::FieldRequired);
        assert_eq!(missing[0].message, "presentDays is required");

        let bad = validator().validate_field(&col, &Normalized::Invalid("abc".into()));
        assert_eq!(bad[0].kind, FailureKind::FieldTypeInvalid);
        assert!(bad[0].message.starts_with("presentDays must be a valid number"));

        let optional = column(ImportDomain::Payrun, "otHours");
        assert!(validator().validate_field(&optional, &Normalized::Empty).is_empty());
    }

    #[test]
    fn test_age_boundary() {
        let dob = column(ImportDomain::Employee, "DOB");
        let today = date(2026, 3, 10);
        let v = RowValidator::new(today, 18);

        let exactly = Normalized::Value(TypedValue::Date(date(2008, 3, 10)));
        assert!(v.validate_field(&dob, &exactly).is_empty());

        let one_day_short = Normalized::Value(TypedValue::Date(date(2008, 3, 11)));
        let out = v.validate_field(&dob, &one_day_short);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, FailureKind::FieldBelowMinimumAge);
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(date(2000, 2, 29), date(2018, 2, 28)), 17);
        assert_eq!(age_on(date(2000, 2, 29), date(2018, 3, 1)), 18);
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), -4);
    }

    #[test]
    fn test_patterns_and_enums() {
        let v = validator();
        let pan = column(ImportDomain::Employee, "panNumber");
        assert!(v.validate_field(&pan, &text("ABCDE1234F")).is_empty());
        let out = v.validate_field(&pan, &text("ABCDE12345"));
        assert_eq!(out[0].kind, FailureKind::FieldPatternInvalid);

        let blood = column(ImportDomain::Employee, "bloodGroup");
        assert!(v.validate_field(&blood, &Normalized::Value(TypedValue::Enum("AB+".into()))).is_empty());
        let out = v.validate_field(&blood, &Normalized::Value(TypedValue::Enum("C+".into())));
        assert_eq!(out[0].kind, FailureKind::FieldPatternInvalid);
        assert!(out[0].message.contains("A+, A-"));

        let salary = column(ImportDomain::Employee, "salaryType");
        let out = v.validate_field(&salary, &Normalized::Value(TypedValue::Enum("Weekly".into())));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_number_bounds() {
        let v = validator();
        let present = column(ImportDomain::Payrun, "presentDays");
        let out = v.validate_field(&present, &Normalized::Value(TypedValue::Number(-1.0)));
        assert_eq!(out[0].kind, FailureKind::FieldOutOfRange);
        let out = v.validate_field(&present, &Normalized::Value(TypedValue::Number(32.0)));
        assert_eq!(out[0].message, "presentDays must be at most 31");
        assert!(v.validate_field(&present, &Normalized::Value(TypedValue::Number(0.0))).is_empty());
    }

    #[test]
    fn test_text_length_limit() {
        let col = column(ImportDomain::Employee, "permanentAddress");
        let long = "x".repeat(256);
        let out = validator().validate_field(&col, &text(&long));
        assert_eq!(out[0].kind, FailureKind::FieldOutOfRange);
    }

    #[test]
    fn test_row_collects_every_violation() {
        let contact = column(ImportDomain::Employee, "contactNumber");
        let emergency = column(ImportDomain::Employee, "emergencyContactNumber");
        let pan = column(ImportDomain::Employee, "panNumber");
        let name = column(ImportDomain::Employee, "name");
        let values = vec![
            (&name, Normalized::Empty),
            (&pan, text("bad")),
            (&contact, text("9876543210")),
            (&emergency, text("9876543210")),
        ];
        let out = validator().validate_row(&values);
        let kinds: Vec<FailureKind> = out.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::FieldRequired,
                FailureKind::FieldPatternInvalid,
                FailureKind::FieldPatternInvalid
            ]
        );
        assert_eq!(out[2].to_string(), "emergencyContactNumber must differ from contactNumber");
    }
}
