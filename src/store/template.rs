use sqlx::types::Json;
use tracing::debug;

use super::{MySqlStore, StoreError, TemplateStore};
use crate::model::template::{ImportDomain, TemplateColumn};

impl TemplateStore for MySqlStore {
    async fn load(
        &self,
        company_id: u64,
        domain: ImportDomain,
    ) -> Result<Option<Vec<TemplateColumn>>, StoreError> {
        let key = (company_id, domain);
        if let Some(columns) = self.templates.get(&key).await {
            debug!(company_id, %domain, "Template cache hit");
            return Ok(Some(columns));
        }

        let saved = sqlx::query_scalar::<_, Json<Vec<TemplateColumn>>>(
            r#"
            SELECT columns
            FROM import_templates
            WHERE company_id = ? AND domain = ?
            "#,
        )
        .bind(company_id)
        .bind(domain.as_ref())
        .fetch_optional(&self.pool)
        .await?
        .map(|Json(columns)| columns);

        if let Some(columns) = &saved {
            self.templates.insert(key, columns.clone()).await;
        }
        Ok(saved)
    }

    async fn save(
        &self,
        company_id: u64,
        domain: ImportDomain,
        columns: &[TemplateColumn],
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO import_templates (company_id, domain, columns)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE columns = VALUES(columns), updated_at = NOW()
            "#,
        )
        .bind(company_id)
        .bind(domain.as_ref())
        .bind(Json(columns))
        .execute(&self.pool)
        .await?;

        self.templates.invalidate(&(company_id, domain)).await;
        debug!(company_id, %domain, columns = columns.len(), "Template saved");
        Ok(())
    }
}
