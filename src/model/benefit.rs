use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Benefit {
    pub id: u64,
    pub company_id: u64,
    #[schema(example = "Health cover")]
    pub title: String,
    #[schema(example = "insurance")]
    pub kind: String,
    #[schema(example = 300.0)]
    pub amount: f64,
    pub active: bool,
}

/// Sum of the amounts of active benefits; inactive ones are ignored.
pub fn active_total(benefits: &[Benefit]) -> f64 {
    benefits
        .iter()
        .filter(|b| b.active)
        .fold(0.0, |total, b| total + b.amount)
}
