use sqlx::types::Json;
use tracing::debug;

use super::{EmployeeDirectory, MySqlStore, StoreError};
use crate::model::employee::Employee;
use crate::model::import::ReconciledRow;

const EMPLOYEE_COLUMNS: &str = r#"
    id, company_id, employee_code, name, fixed_stipend, special_allowance,
    ot_rate_per_hour, transport_allowance, canteen_allowance, canteen_deduction,
    management_fee, insurance, pf_enrolled, esi_enrolled, status
"#;

impl EmployeeDirectory for MySqlStore {
    async fn lookup_by_business_id(
        &self,
        company_id: u64,
        employee_id: &str,
    ) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees \
             WHERE company_id = ? AND LOWER(TRIM(employee_code)) = LOWER(TRIM(?))"
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn list(&self, company_id: u64) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE company_id = ? ORDER BY id");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        debug!(company_id, count = employees.len(), "Loaded employee directory");
        Ok(employees)
    }

    async fn create(&self, company_id: u64, row: &ReconciledRow) -> Result<u64, StoreError> {
        let name = row
            .name
            .clone()
            .or_else(|| row.text("name").map(String::from))
            .unwrap_or_default();

        // Profile fields the sheet does not carry start at zero; the remaining
        // sheet columns are kept as JSON.
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (company_id, employee_code, name, fixed_stipend, status, details)
            VALUES (?, ?, ?, ?, 'active', ?)
            "#,
        )
        .bind(company_id)
        .bind(row.employee_id.trim())
        .bind(name)
        .bind(row.number("fixedStipend").unwrap_or(0.0))
        .bind(Json(&row.fields))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }
}
