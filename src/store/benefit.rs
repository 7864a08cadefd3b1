use super::{BenefitSource, MySqlStore, StoreError};
use crate::model::benefit::Benefit;

impl BenefitSource for MySqlStore {
    async fn list_active(&self, company_id: u64) -> Result<Vec<Benefit>, StoreError> {
        let benefits = sqlx::query_as::<_, Benefit>(
            r#"
            SELECT id, company_id, title, kind, amount, active
            FROM benefits
            WHERE company_id = ? AND active = TRUE
            ORDER BY id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(benefits)
    }
}
