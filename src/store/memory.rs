use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{BenefitSource, EmployeeDirectory, PayrunStore, StoreError, TemplateStore};
use crate::model::benefit::Benefit;
use crate::model::employee::Employee;
use crate::model::import::ReconciledRow;
use crate::model::payroll::{PayrunPeriod, PayrunResult};
use crate::model::template::{ImportDomain, TemplateColumn};

/// In-process store with failure injection for service tests.
#[derive(Default)]
pub struct MemoryStore {
    pub employees: Mutex<Vec<Employee>>,
    pub templates: Mutex<HashMap<(u64, ImportDomain), Vec<TemplateColumn>>>,
    /// (company_id, payrun)
    pub payruns: Mutex<Vec<(u64, PayrunResult)>>,
    pub benefits: Mutex<Vec<Benefit>>,
    /// Employee codes whose writes fail
    pub failing_codes: Mutex<HashSet<String>>,
    pub directory_reads: Mutex<usize>,
}

pub fn employee(id: u64, company_id: u64, code: &str, name: &str) -> Employee {
    Employee {
        id,
        company_id,
        employee_code: code.to_string(),
        name: name.to_string(),
        fixed_stipend: 30000.0,
        special_allowance: 0.0,
        ot_rate_per_hour: None,
        transport_allowance: 0.0,
        canteen_allowance: 0.0,
        canteen_deduction: 0.0,
        management_fee: 0.0,
        insurance: 0.0,
        pf_enrolled: false,
        esi_enrolled: false,
        status: "active".to_string(),
    }
}

impl MemoryStore {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
            ..Self::default()
        }
    }

    pub fn fail_writes_for(&self, code: &str) {
        self.failing_codes.lock().unwrap().insert(code.to_string());
    }

    fn check_write(&self, code: &str) -> Result<(), StoreError> {
        if self.failing_codes.lock().unwrap().contains(code) {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "write rejected for {code}"
            ))));
        }
        Ok(())
    }
}

impl EmployeeDirectory for MemoryStore {
    async fn lookup_by_business_id(
        &self,
        company_id: u64,
        employee_id: &str,
    ) -> Result<Vec<Employee>, StoreError> {
        let wanted = employee_id.trim().to_lowercase();
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.company_id == company_id && e.employee_code.trim().to_lowercase() == wanted)
            .cloned()
            .collect())
    }

    async fn list(&self, company_id: u64) -> Result<Vec<Employee>, StoreError> {
        *self.directory_reads.lock().unwrap() += 1;
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn create(&self, company_id: u64, row: &ReconciledRow) -> Result<u64, StoreError> {
        self.check_write(&row.employee_id)?;
        let mut employees = self.employees.lock().unwrap();
        let id = employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let mut created = employee(
            id,
            company_id,
            &row.employee_id,
            row.name.as_deref().unwrap_or_default(),
        );
        created.fixed_stipend = row.number("fixedStipend").unwrap_or(0.0);
        employees.push(created);
        Ok(id)
    }
}

impl TemplateStore for MemoryStore {
    async fn load(
        &self,
        company_id: u64,
        domain: ImportDomain,
    ) -> Result<Option<Vec<TemplateColumn>>, StoreError> {
        Ok(self.templates.lock().unwrap().get(&(company_id, domain)).cloned())
    }

    async fn save(
        &self,
        company_id: u64,
        domain: ImportDomain,
        columns: &[TemplateColumn],
    ) -> Result<(), StoreError> {
        self.templates
            .lock()
            .unwrap()
            .insert((company_id, domain), columns.to_vec());
        Ok(())
    }
}

impl PayrunStore for MemoryStore {
    async fn period_exists(&self, company_id: u64, period: PayrunPeriod) -> Result<bool, StoreError> {
        Ok(!PayrunStore::list(self, company_id, period).await?.is_empty())
    }

    async fn delete_period(&self, company_id: u64, period: PayrunPeriod) -> Result<u64, StoreError> {
        let mut payruns = self.payruns.lock().unwrap();
        let before = payruns.len();
        payruns.retain(|(c, r)| {
            !(*c == company_id && r.month == period.month_name() && r.year == period.year)
        });
        Ok((before - payruns.len()) as u64)
    }

    async fn save(&self, company_id: u64, result: &PayrunResult) -> Result<(), StoreError> {
        self.check_write(&result.employee_code)?;
        self.payruns.lock().unwrap().push((company_id, result.clone()));
        Ok(())
    }

    async fn list(&self, company_id: u64, period: PayrunPeriod) -> Result<Vec<PayrunResult>, StoreError> {
        Ok(self
            .payruns
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, r)| *c == company_id && r.month == period.month_name() && r.year == period.year)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl BenefitSource for MemoryStore {
    async fn list_active(&self, company_id: u64) -> Result<Vec<Benefit>, StoreError> {
        Ok(self
            .benefits
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.company_id == company_id && b.active)
            .cloned()
            .collect())
    }
}
