use tracing::debug;

use super::{MySqlStore, PayrunStore, StoreError};
use crate::model::payroll::{PayrunPeriod, PayrunResult};

const PAYRUN_COLUMNS: &str = r#"
    employee_internal_id, employee_code, name, month, year,
    present_days, holidays, ot_hours, lop_days, total_fixed_days, total_payable_days,
    fixed_stipend, special_allowance, earned_stipend, earned_special_allowance,
    earnings_ot, transport, canteen, attendance_incentive, total_earning,
    management_fee, insurance, canteen_deduction, lop, total_deductions,
    pf_amount, esi_amount, billable_total, gst, grand_total, final_netpay, remarks
"#;

impl PayrunStore for MySqlStore {
    async fn period_exists(&self, company_id: u64, period: PayrunPeriod) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM payruns
            WHERE company_id = ? AND month = ? AND year = ?
            "#,
        )
        .bind(company_id)
        .bind(period.month_name())
        .bind(period.year)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn delete_period(&self, company_id: u64, period: PayrunPeriod) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM payruns WHERE company_id = ? AND month = ? AND year = ?")
            .bind(company_id)
            .bind(period.month_name())
            .bind(period.year)
            .execute(&self.pool)
            .await?;
        debug!(company_id, %period, removed = result.rows_affected(), "Deleted payrun period");
        Ok(result.rows_affected())
    }

    async fn save(&self, company_id: u64, r: &PayrunResult) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO payruns (company_id, {PAYRUN_COLUMNS}) VALUES ({})",
            vec!["?"; 33].join(", ")
        );
        sqlx::query(&sql)
            .bind(company_id)
            .bind(r.employee_internal_id)
            .bind(&r.employee_code)
            .bind(&r.name)
            .bind(&r.month)
            .bind(r.year)
            .bind(r.present_days)
            .bind(r.holidays)
            .bind(r.ot_hours)
            .bind(r.lop_days)
            .bind(r.total_fixed_days)
            .bind(r.total_payable_days)
            .bind(r.fixed_stipend)
            .bind(r.special_allowance)
            .bind(r.earned_stipend)
            .bind(r.earned_special_allowance)
            .bind(r.earnings_ot)
            .bind(r.transport)
            .bind(r.canteen)
            .bind(r.attendance_incentive)
            .bind(r.total_earning)
            .bind(r.management_fee)
            .bind(r.insurance)
            .bind(r.canteen_deduction)
            .bind(r.lop)
            .bind(r.total_deductions)
            .bind(r.pf_amount)
            .bind(r.esi_amount)
            .bind(r.billable_total)
            .bind(r.gst)
            .bind(r.grand_total)
            .bind(r.final_netpay)
            .bind(&r.remarks)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, company_id: u64, period: PayrunPeriod) -> Result<Vec<PayrunResult>, StoreError> {
        let sql = format!(
            "SELECT {PAYRUN_COLUMNS} FROM payruns \
             WHERE company_id = ? AND month = ? AND year = ? ORDER BY employee_code"
        );
        let results = sqlx::query_as::<_, PayrunResult>(&sql)
            .bind(company_id)
            .bind(period.month_name())
            .bind(period.year)
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }
}
