use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "company_id": 7,
        "employee_code": "EMP1001",
        "name": "John Doe",
        "fixed_stipend": 25000.0,
        "special_allowance": 2000.0,
        "ot_rate_per_hour": null,
        "transport_allowance": 1200.0,
        "canteen_allowance": 800.0,
        "canteen_deduction": 800.0,
        "management_fee": 500.0,
        "insurance": 250.0,
        "pf_enrolled": true,
        "esi_enrolled": false,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub company_id: u64,

    /// Business-visible employee identifier
    #[schema(example = "EMP1001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = 25000.0)]
    pub fixed_stipend: f64,

    #[schema(example = 2000.0)]
    pub special_allowance: f64,

    #[schema(nullable = true)]
    pub ot_rate_per_hour: Option<f64>,

    pub transport_allowance: f64,
    pub canteen_allowance: f64,
    pub canteen_deduction: f64,
    pub management_fee: f64,
    pub insurance: f64,
    pub pf_enrolled: bool,
    pub esi_enrolled: bool,

    #[schema(example = "active")]
    pub status: String,
}

/// Compensation inputs the payrun calculator needs from an employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub fixed_stipend: f64,
    pub special_allowance: f64,
    pub ot_rate_per_hour: Option<f64>,
    pub transport_allowance: f64,
    pub canteen_allowance: f64,
    pub canteen_deduction: f64,
    pub management_fee: f64,
    pub insurance: f64,
    pub pf_enrolled: bool,
    pub esi_enrolled: bool,
}

impl Employee {
    pub fn profile(&self) -> EmployeeProfile {
        EmployeeProfile {
            fixed_stipend: self.fixed_stipend,
            special_allowance: self.special_allowance,
            ot_rate_per_hour: self.ot_rate_per_hour,
            transport_allowance: self.transport_allowance,
            canteen_allowance: self.canteen_allowance,
            canteen_deduction: self.canteen_deduction,
            management_fee: self.management_fee,
            insurance: self.insurance,
            pf_enrolled: self.pf_enrolled,
            esi_enrolled: self.esi_enrolled,
        }
    }
}
