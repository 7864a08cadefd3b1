//! Per-field validation rules keyed by template column key.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::import::template::BLOOD_GROUPS;

pub const DEFAULT_MAX_TEXT_LEN: usize = 255;

static AADHAAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));
static PAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid regex"));
static IFSC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

#[derive(Clone, Copy)]
pub struct Pattern {
    regex: &'static Lazy<Regex>,
    pub message: &'static str,
}

impl Pattern {
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("regex", &self.regex.as_str())
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub uppercase: bool,
    pub max_len: usize,
    pub pattern: Option<Pattern>,
    pub allowed: Option<&'static [&'static str]>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Value is a date of birth checked against the minimum age
    pub min_age: bool,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            uppercase: false,
            max_len: DEFAULT_MAX_TEXT_LEN,
            pattern: None,
            allowed: None,
            min: None,
            max: None,
            min_age: false,
        }
    }
}

fn pattern(regex: &'static Lazy<Regex>, message: &'static str) -> Option<Pattern> {
    Some(Pattern { regex, message })
}

/// Rules for a column key. Unknown and custom keys only get the defaults.
pub fn rules_for(key: &str) -> FieldRules {
    let base = FieldRules::default();
    match key {
        "adharNumber" => FieldRules {
            pattern: pattern(&AADHAAR, "must be 12 digits"),
            ..base
        },
        "panNumber" => FieldRules {
            uppercase: true,
            pattern: pattern(&PAN, "must be 5 letters, 4 digits and 1 letter"),
            ..base
        },
        "ifscCode" => FieldRules {
            uppercase: true,
            pattern: pattern(&IFSC, "must be 4 letters, a zero and 6 letters or digits"),
            ..base
        },
        "contactNumber" | "emergencyContactNumber" => FieldRules {
            pattern: pattern(&PHONE, "must be 10 digits"),
            ..base
        },
        "bloodGroup" => FieldRules {
            uppercase: true,
            allowed: Some(&BLOOD_GROUPS),
            ..base
        },
        "DOB" | "dateOfBirth" => FieldRules {
            min_age: true,
            ..base
        },
        "presentDays" | "holidays" | "totalFixedDays" | "lopDays" => FieldRules {
            min: Some(0.0),
            max: Some(31.0),
            ..base
        },
        "fixedStipend" | "otHours" | "transport" | "canteen" => FieldRules {
            min: Some(0.0),
            ..base
        },
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns() {
        let aadhaar = rules_for("adharNumber").pattern.unwrap();
        assert!(aadhaar.is_match("123412341234"));
        assert!(!aadhaar.is_match("1234 1234 1234"));

        let pan = rules_for("panNumber").pattern.unwrap();
        assert!(pan.is_match("ABCDE1234F"));
        assert!(!pan.is_match("ABCD12345F"));

        let ifsc = rules_for("ifscCode").pattern.unwrap();
        assert!(ifsc.is_match("SBIN0001234"));
        assert!(ifsc.is_match("HDFC0ABC123"));
        assert!(!ifsc.is_match("SBIN1001234"));

        let phone = rules_for("contactNumber").pattern.unwrap();
        assert!(phone.is_match("9876543210"));
        assert!(!phone.is_match("98765 43210"));
    }

    #[test]
    fn test_case_transform_only_where_asked() {
        assert!(rules_for("panNumber").uppercase);
        assert!(rules_for("ifscCode").uppercase);
        assert!(!rules_for("name").uppercase);
        assert!(!rules_for("custom_shift_code").uppercase);
    }
}
