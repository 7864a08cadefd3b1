use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::import::ReconciledRow;

/// Month and year a payrun belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrunPeriod {
    pub month: Month,
    pub year: i32,
}

impl PayrunPeriod {
    /// Accepts full or abbreviated English month names ("January", "jan").
    pub fn parse(month: &str, year: i32) -> Option<Self> {
        let month = month.trim().parse::<Month>().ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
        Some(Self { month, year })
    }

    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    pub fn days_in_month(&self) -> u32 {
        let first = NaiveDate::from_ymd_opt(self.year, self.month.number_from_month(), 1);
        let next = match self.month {
            Month::December => NaiveDate::from_ymd_opt(self.year + 1, 1, 1),
            m => NaiveDate::from_ymd_opt(self.year, m.number_from_month() + 1, 1),
        };
        match (first, next) {
            (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
            _ => 30,
        }
    }
}

impl std::fmt::Display for PayrunPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Stored payrun figures for one employee and one month.
///
/// `final_netpay` is `total_earning - total_deductions`; company benefits are
/// applied when the payrun is presented, see [`PayrunCalculation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrunResult {
    pub employee_internal_id: u64,
    #[schema(example = "EMP1001")]
    pub employee_code: String,
    pub name: String,
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,

    pub present_days: f64,
    pub holidays: f64,
    pub ot_hours: f64,
    pub lop_days: f64,
    pub total_fixed_days: f64,
    pub total_payable_days: f64,

    pub fixed_stipend: f64,
    pub special_allowance: f64,
    pub earned_stipend: f64,
    pub earned_special_allowance: f64,
    pub earnings_ot: f64,
    pub transport: f64,
    pub canteen: f64,
    pub attendance_incentive: f64,
    pub total_earning: f64,

    pub management_fee: f64,
    pub insurance: f64,
    pub canteen_deduction: f64,
    pub lop: f64,
    pub total_deductions: f64,

    pub pf_amount: f64,
    pub esi_amount: f64,
    pub billable_total: f64,
    pub gst: f64,
    pub grand_total: f64,
    pub final_netpay: f64,

    #[schema(nullable = true)]
    pub remarks: Option<String>,
}

/// A payrun together with its presentation-time benefit adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrunCalculation {
    #[serde(flatten)]
    pub result: PayrunResult,
    pub benefits_total: f64,
    pub adjusted_total_deductions: f64,
    pub adjusted_netpay: f64,
}

/// An accepted payrun row: the reconciled sheet row and the payrun saved for it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPayrun {
    #[schema(value_type = Object, example = json!({
        "employeeId": "EMP1001",
        "internalId": 1,
        "name": "John Doe",
        "fields": { "empId": "EMP1001", "presentDays": 22 },
        "sourceRowNumber": 2
    }))]
    pub row: ReconciledRow,
    pub calculation: PayrunCalculation,
}

/// Period totals over the benefit-adjusted payruns.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrunSummary {
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 12)]
    pub total_employees: usize,
    /// Sum of adjusted net pay
    pub total_salary: f64,
    pub total_billable: f64,
    #[serde(rename = "totalGST")]
    pub total_gst: f64,
    pub total_grand_total: f64,
}
