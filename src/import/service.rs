//! Import orchestration over the stores: template and directory loading, the
//! pure reconciliation pass, payrun calculation and row-by-row persistence.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::import::calculator::{PayrunPolicy, calculate_payrun, summarize_period, with_benefits};
use crate::import::error::BatchError;
use crate::import::reconcile::{ReconcileOptions, reconcile_batch};
use crate::import::template::{default_template, merge_with_saved};
use crate::model::import::{CellValue, FailureKind, ImportError, ImportSummary, ReconciledRow};
use crate::model::payroll::{ImportedPayrun, PayrunCalculation, PayrunPeriod, PayrunSummary};
use crate::model::template::{ImportDomain, TemplateColumn};
use crate::store::{BenefitSource, EmployeeDirectory, PayrunStore, StoreError, TemplateStore};

/// Per-request settings taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub today: NaiveDate,
    pub min_age: u32,
    pub policy: PayrunPolicy,
}

/// Active template of a company: its saved columns merged with the defaults,
/// or the defaults alone when nothing was saved.
pub async fn load_template<S: TemplateStore>(
    store: &S,
    company_id: u64,
    domain: ImportDomain,
) -> Result<Vec<TemplateColumn>, StoreError> {
    let defaults = default_template(domain);
    Ok(match store.load(company_id, domain).await? {
        Some(saved) => merge_with_saved(&defaults, saved),
        None => defaults,
    })
}

#[derive(Debug, Clone)]
pub struct PayrunImport {
    pub company_id: u64,
    pub period: PayrunPeriod,
    /// Delete an already imported period instead of refusing the upload
    pub replace_existing: bool,
    pub grid: Vec<Vec<CellValue>>,
}

#[instrument(
    name = "payrun_import",
    skip(store, request, settings),
    fields(
        company_id = request.company_id,
        period = %request.period,
        batch_id = tracing::field::Empty
    )
)]
pub async fn import_payrun<S>(
    store: &S,
    request: &PayrunImport,
    settings: &ImportSettings,
) -> Result<ImportSummary<ImportedPayrun>, BatchError>
where
    S: EmployeeDirectory + TemplateStore + PayrunStore + BenefitSource,
{
    let batch_id = Uuid::new_v4();
    tracing::Span::current().record("batch_id", tracing::field::display(batch_id));

    let columns = load_template(store, request.company_id, ImportDomain::Payrun).await?;
    let directory = EmployeeDirectory::list(store, request.company_id).await?;
    let options = ReconcileOptions {
        domain: ImportDomain::Payrun,
        today: settings.today,
        min_age: settings.min_age,
        batch_id,
    };
    let reconciled = reconcile_batch(&request.grid, &columns, &directory, &options)?;

    if store.period_exists(request.company_id, request.period).await? {
        if !request.replace_existing {
            info!("Payrun period already imported");
            return Err(BatchError::PeriodAlreadyImported(request.period.to_string()));
        }
        if !reconciled.success().is_empty() {
            let removed = store.delete_period(request.company_id, request.period).await?;
            info!(removed, "Replacing existing payrun period");
        }
    }

    let benefits = store.list_active(request.company_id).await?;
    let (rows, mut summary) = reconciled.take_success::<ImportedPayrun>();

    for row in rows {
        let Some(employee) = row
            .internal_id
            .and_then(|id| directory.iter().find(|e| e.id == id))
        else {
            summary.reject(ImportError::single(
                row.source_row_number,
                Some(row.employee_id.clone()),
                FailureKind::EmployeeNotFound,
                format!("Employee ID {} not found", row.employee_id),
            ));
            continue;
        };

        let calculation = calculate_payrun(
            &row,
            &employee.profile(),
            &benefits,
            request.period,
            &settings.policy,
        );
        match PayrunStore::save(store, request.company_id, &calculation.result).await {
            Ok(()) => summary.accept(ImportedPayrun { row, calculation }),
            Err(e) => {
                warn!(
                    error = %e,
                    row = row.source_row_number,
                    employee_id = %row.employee_id,
                    "Failed to save payrun"
                );
                summary.reject(ImportError::single(
                    row.source_row_number,
                    Some(row.employee_id),
                    FailureKind::PersistenceFailure,
                    format!("could not save payrun: {e}"),
                ));
            }
        }
    }

    let summary = summary.finish();
    info!(
        saved = summary.success().len(),
        failed = summary.errors().len(),
        total = summary.total_processed(),
        "Payrun import finished"
    );
    Ok(summary)
}

#[instrument(
    name = "employee_import",
    skip(store, grid, settings),
    fields(batch_id = tracing::field::Empty)
)]
pub async fn import_employees<S>(
    store: &S,
    company_id: u64,
    grid: &[Vec<CellValue>],
    settings: &ImportSettings,
) -> Result<ImportSummary<ReconciledRow>, BatchError>
where
    S: EmployeeDirectory + TemplateStore,
{
    let batch_id = Uuid::new_v4();
    tracing::Span::current().record("batch_id", tracing::field::display(batch_id));

    let columns = load_template(store, company_id, ImportDomain::Employee).await?;
    let directory = EmployeeDirectory::list(store, company_id).await?;
    let options = ReconcileOptions {
        domain: ImportDomain::Employee,
        today: settings.today,
        min_age: settings.min_age,
        batch_id,
    };
    let reconciled = reconcile_batch(grid, &columns, &directory, &options)?;
    let (rows, mut summary) = reconciled.take_success::<ReconciledRow>();

    for mut row in rows {
        // The directory snapshot may be stale by now.
        let existing = store.lookup_by_business_id(company_id, &row.employee_id).await;
        let outcome = match existing {
            Ok(found) if !found.is_empty() => Err(ImportError::single(
                row.source_row_number,
                Some(row.employee_id.clone()),
                FailureKind::DuplicateEmployee,
                format!("Employee ID {} already exists", row.employee_id),
            )),
            Ok(_) => store.create(company_id, &row).await.map_err(|e| {
                warn!(error = %e, row = row.source_row_number, "Failed to create employee");
                ImportError::single(
                    row.source_row_number,
                    Some(row.employee_id.clone()),
                    FailureKind::PersistenceFailure,
                    format!("could not save employee: {e}"),
                )
            }),
            Err(e) => Err(ImportError::single(
                row.source_row_number,
                Some(row.employee_id.clone()),
                FailureKind::PersistenceFailure,
                format!("could not check employee: {e}"),
            )),
        };
        match outcome {
            Ok(id) => {
                row.internal_id = Some(id);
                summary.accept(row);
            }
            Err(error) => summary.reject(error),
        }
    }

    let summary = summary.finish();
    info!(
        created = summary.success().len(),
        failed = summary.errors().len(),
        "Employee import finished"
    );
    Ok(summary)
}

/// Stored payruns of a period with the company's active benefits applied.
pub async fn list_payruns<S>(
    store: &S,
    company_id: u64,
    period: PayrunPeriod,
) -> Result<Vec<PayrunCalculation>, StoreError>
where
    S: PayrunStore + BenefitSource,
{
    let benefits = store.list_active(company_id).await?;
    let results = PayrunStore::list(store, company_id, period).await?;
    Ok(results
        .into_iter()
        .map(|r| with_benefits(r, &benefits))
        .collect())
}

/// Period totals over [`list_payruns`].
pub async fn summarize_payruns<S>(
    store: &S,
    company_id: u64,
    period: PayrunPeriod,
) -> Result<PayrunSummary, StoreError>
where
    S: PayrunStore + BenefitSource,
{
    let payruns = list_payruns(store, company_id, period).await?;
    Ok(summarize_period(period, &payruns))
}
