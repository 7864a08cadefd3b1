//! Monthly payrun figures for one accepted row.

use serde::{Deserialize, Serialize};

use crate::model::benefit::{Benefit, active_total};
use crate::model::employee::EmployeeProfile;
use crate::model::import::ReconciledRow;
use crate::model::payroll::{PayrunCalculation, PayrunPeriod, PayrunResult, PayrunSummary};

/// Statutory rates and business constants used by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrunPolicy {
    pub gst_rate: f64,
    pub pf_rate: f64,
    pub pf_wage_ceiling: f64,
    pub esi_rate: f64,
    pub esi_wage_ceiling: f64,
    pub incentive_threshold_days: f64,
    pub incentive_amount: f64,
    pub standard_hours_per_day: f64,
}

impl Default for PayrunPolicy {
    fn default() -> Self {
        Self {
            gst_rate: 0.18,
            pf_rate: 0.12,
            pf_wage_ceiling: 15_000.0,
            esi_rate: 0.0325,
            esi_wage_ceiling: 21_000.0,
            incentive_threshold_days: 26.0,
            incentive_amount: 500.0,
            standard_hours_per_day: 8.0,
        }
    }
}

#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-day share of a monthly amount; zero when there are no fixed days.
fn per_day(amount: f64, fixed_days: f64) -> f64 {
    if fixed_days > 0.0 {
        amount / fixed_days
    } else {
        0.0
    }
}

/// Computes the payrun of one employee for `period`.
///
/// Totals are built from already rounded components so that
/// `final_netpay == total_earning - total_deductions` holds on the stored
/// figures. Net pay may be negative. Benefits only affect the `adjusted_*`
/// figures, never the stored result.
pub fn calculate_payrun(
    row: &ReconciledRow,
    profile: &EmployeeProfile,
    benefits: &[Benefit],
    period: PayrunPeriod,
    policy: &PayrunPolicy,
) -> PayrunCalculation {
    let input = |key: &str| row.number(key).unwrap_or(0.0);
    let present_days = input("presentDays");
    let holidays = input("holidays");
    let ot_hours = input("otHours");
    let lop_days = input("lopDays");

    let total_fixed_days = match row.number("totalFixedDays") {
        Some(days) if days > 0.0 => days,
        _ => f64::from(period.days_in_month()),
    };
    let total_payable_days = (present_days + holidays).min(total_fixed_days);

    let daily_stipend = per_day(profile.fixed_stipend, total_fixed_days);
    let earned_stipend = round2(daily_stipend * total_payable_days);
    let earned_special_allowance =
        round2(per_day(profile.special_allowance, total_fixed_days) * total_payable_days);

    let ot_rate = profile
        .ot_rate_per_hour
        .unwrap_or_else(|| per_day(daily_stipend, policy.standard_hours_per_day));
    let earnings_ot = round2(ot_rate * ot_hours);

    let transport = round2(row.number("transport").unwrap_or(profile.transport_allowance));
    let canteen = round2(row.number("canteen").unwrap_or(profile.canteen_allowance));
    let attendance_incentive = if present_days >= policy.incentive_threshold_days {
        round2(policy.incentive_amount)
    } else {
        0.0
    };
    let total_earning = round2(
        earned_stipend
            + earned_special_allowance
            + earnings_ot
            + transport
            + canteen
            + attendance_incentive,
    );

    let management_fee = round2(profile.management_fee);
    let insurance = round2(profile.insurance);
    let canteen_deduction = round2(profile.canteen_deduction);
    let lop = round2(daily_stipend * lop_days);
    let total_deductions = round2(management_fee + insurance + canteen_deduction + lop);

    let pf_amount = if profile.pf_enrolled {
        round2(policy.pf_rate * earned_stipend.min(policy.pf_wage_ceiling))
    } else {
        0.0
    };
    let esi_amount = if profile.esi_enrolled && total_earning <= policy.esi_wage_ceiling {
        round2(policy.esi_rate * total_earning)
    } else {
        0.0
    };
    let billable_total = round2(total_earning + pf_amount + esi_amount);
    let gst = round2(billable_total * policy.gst_rate);
    let grand_total = round2(billable_total + gst);
    let final_netpay = round2(total_earning - total_deductions);

    let result = PayrunResult {
        employee_internal_id: row.internal_id.unwrap_or_default(),
        employee_code: row.employee_id.clone(),
        name: row.name.clone().or_else(|| row.text("name").map(String::from)).unwrap_or_default(),
        month: period.month_name().to_string(),
        year: period.year,
        present_days,
        holidays,
        ot_hours,
        lop_days,
        total_fixed_days,
        total_payable_days,
        fixed_stipend: round2(profile.fixed_stipend),
        special_allowance: round2(profile.special_allowance),
        earned_stipend,
        earned_special_allowance,
        earnings_ot,
        transport,
        canteen,
        attendance_incentive,
        total_earning,
        management_fee,
        insurance,
        canteen_deduction,
        lop,
        total_deductions,
        pf_amount,
        esi_amount,
        billable_total,
        gst,
        grand_total,
        final_netpay,
        remarks: row.text("remarks").map(String::from),
    };
    with_benefits(result, benefits)
}

/// Presentation-time benefit adjustment of a stored payrun.
pub fn with_benefits(result: PayrunResult, benefits: &[Benefit]) -> PayrunCalculation {
    let benefits_total = round2(active_total(benefits));
    PayrunCalculation {
        adjusted_total_deductions: round2(result.total_deductions + benefits_total),
        adjusted_netpay: round2(result.final_netpay - benefits_total),
        benefits_total,
        result,
    }
}

/// Totals of a period's payruns; salary is the benefit-adjusted net pay.
pub fn summarize_period(period: PayrunPeriod, payruns: &[PayrunCalculation]) -> PayrunSummary {
    let mut summary = PayrunSummary {
        month: period.month.name().to_string(),
        year: period.year,
        total_employees: payruns.len(),
        total_salary: 0.0,
        total_billable: 0.0,
        total_gst: 0.0,
        total_grand_total: 0.0,
    };
    for p in payruns {
        summary.total_salary += p.adjusted_netpay;
        summary.total_billable += p.result.billable_total;
        summary.total_gst += p.result.gst;
        summary.total_grand_total += p.result.grand_total;
    }
    summary.total_salary = round2(summary.total_salary);
    summary.total_billable = round2(summary.total_billable);
    summary.total_gst = round2(summary.total_gst);
    summary.total_grand_total = round2(summary.total_grand_total);
    summary
}
