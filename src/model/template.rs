use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Value type a spreadsheet column is normalized into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Date,
    Enum,
}

/// Which import a template drives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImportDomain {
    Employee,
    Payrun,
}

impl ImportDomain {
    /// Template key of the column carrying the business employee identifier.
    pub fn identifier_key(&self) -> &'static str {
        match self {
            ImportDomain::Employee => "empIdNo",
            ImportDomain::Payrun => "empId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "key": "presentDays",
    "displayName": "Present Days",
    "systemLabel": "Present Days",
    "required": true,
    "valueType": "number"
}))]
pub struct TemplateColumn {
    /// System field identifier, unique within a template
    pub key: String,
    /// Header text the user expects in the uploaded sheet
    pub display_name: String,
    /// Canonical label, fixed once the column exists
    pub system_label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

pub const CUSTOM_KEY_PREFIX: &str = "custom_";
pub const CUSTOM_SYSTEM_LABEL: &str = "Custom Field";

impl TemplateColumn {
    pub fn system(key: &str, label: &str, required: bool, value_type: ValueType) -> Self {
        Self {
            key: key.to_string(),
            display_name: label.to_string(),
            system_label: label.to_string(),
            required,
            value_type,
            enum_values: None,
        }
    }

    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.value_type = ValueType::Enum;
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn is_custom(&self) -> bool {
        self.key.starts_with(CUSTOM_KEY_PREFIX)
    }
}
