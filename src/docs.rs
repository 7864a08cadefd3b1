use crate::api::employee::EmployeeImportRequest;
use crate::api::payrun::{PayrunImportRequest, PayrunListResponse, PayrunQuery};
use crate::api::template::{AddColumn, RenameColumn, SampleResponse, SaveTemplate, TemplateResponse};
use crate::model::import::{FailureKind, ImportError};
use crate::model::payroll::{ImportedPayrun, PayrunCalculation, PayrunResult, PayrunSummary};
use crate::model::template::{ImportDomain, TemplateColumn, ValueType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payrun Import API",
        version = "1.0.0",
        description = r#"
## Payrun import and reconciliation

Back end for importing monthly attendance sheets and employee lists into a
company's payroll.

### 🔹 Key Features
- **Column templates**
  - Per company and import domain; rename headers, add custom columns, remove optional ones
  - Download a sample sheet matching the active template
- **Payrun import**
  - Headers matched by name in any order, cells normalized (dates, currency, enums)
  - Rows matched to employees by Employee ID; bad rows are reported, good rows are saved
  - Earnings, deductions, PF/ESI, GST and net pay calculated per employee
  - Period totals (employees, salary, billable, GST, grand total) per month
- **Employee import**
  - Bulk creation of employees with field validation and duplicate detection

### 📦 Response Format
- Imports return `{ batchId, success[], errors[], totalProcessed, unresolvedColumns[] }`
- Every error message names its source row

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::template::get_template,
        crate::api::template::save_template,
        crate::api::template::add_column,
        crate::api::template::rename_template_column,
        crate::api::template::delete_template_column,
        crate::api::template::template_sample,

        crate::api::payrun::import_payrun,
        crate::api::payrun::list_payruns,
        crate::api::payrun::payrun_summary,

        crate::api::employee::import_employees
    ),
    components(
        schemas(
            TemplateColumn,
            ValueType,
            ImportDomain,
            TemplateResponse,
            SaveTemplate,
            AddColumn,
            RenameColumn,
            SampleResponse,
            PayrunImportRequest,
            PayrunQuery,
            PayrunListResponse,
            PayrunResult,
            PayrunCalculation,
            ImportedPayrun,
            PayrunSummary,
            EmployeeImportRequest,
            ImportError,
            FailureKind
        )
    ),
    tags(
        (name = "Template", description = "Import column template APIs"),
        (name = "Payrun", description = "Payrun import and listing APIs"),
        (name = "Employee", description = "Employee import APIs"),
    )
)]
pub struct ApiDoc;
