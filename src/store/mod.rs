//! Collaborators the import pipeline reads from and writes to.
//!
//! [`MySqlStore`] backs every trait with the application database; the
//! in-memory store in `memory` backs the service tests.

use derive_more::Display;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::model::benefit::Benefit;
use crate::model::employee::Employee;
use crate::model::import::ReconciledRow;
use crate::model::payroll::{PayrunPeriod, PayrunResult};
use crate::model::template::{ImportDomain, TemplateColumn};

mod benefit;
mod employee;
#[cfg(test)]
pub mod memory;
mod payrun;
mod template;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "stored data could not be read: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { source, .. } | sqlx::Error::Decode(source) => {
                StoreError::Corrupt(source.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Company employee records, read-only to the payrun import.
pub trait EmployeeDirectory {
    /// Employees whose code equals `employee_id`, trimmed and ignoring case.
    async fn lookup_by_business_id(
        &self,
        company_id: u64,
        employee_id: &str,
    ) -> Result<Vec<Employee>, StoreError>;

    async fn list(&self, company_id: u64) -> Result<Vec<Employee>, StoreError>;

    /// Inserts an employee from an accepted employee-import row and returns its id.
    async fn create(&self, company_id: u64, row: &ReconciledRow) -> Result<u64, StoreError>;
}

pub trait TemplateStore {
    async fn load(
        &self,
        company_id: u64,
        domain: ImportDomain,
    ) -> Result<Option<Vec<TemplateColumn>>, StoreError>;

    async fn save(
        &self,
        company_id: u64,
        domain: ImportDomain,
        columns: &[TemplateColumn],
    ) -> Result<(), StoreError>;
}

pub trait PayrunStore {
    async fn period_exists(&self, company_id: u64, period: PayrunPeriod) -> Result<bool, StoreError>;

    /// Removes every payrun of the period and returns how many were removed.
    async fn delete_period(&self, company_id: u64, period: PayrunPeriod) -> Result<u64, StoreError>;

    async fn save(&self, company_id: u64, result: &PayrunResult) -> Result<(), StoreError>;

    async fn list(&self, company_id: u64, period: PayrunPeriod) -> Result<Vec<PayrunResult>, StoreError>;
}

pub trait BenefitSource {
    async fn list_active(&self, company_id: u64) -> Result<Vec<Benefit>, StoreError>;
}

/// Saved templates keyed by company and domain.
pub type TemplateCache = Cache<(u64, ImportDomain), Vec<TemplateColumn>>;

pub fn template_cache(ttl_secs: u64) -> TemplateCache {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(std::time::Duration::from_secs(ttl_secs))
        .build()
}

/// Database-backed implementation of every store trait.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    templates: TemplateCache,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, templates: TemplateCache) -> Self {
        Self { pool, templates }
    }
}
