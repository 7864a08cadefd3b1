use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::api::ApiError;
use crate::config::Config;
use crate::import::service;
use crate::model::import::CellValue;
use crate::store::MySqlStore;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImportRequest {
    #[schema(example = 7)]
    pub company_id: u64,
    /// Extracted sheet: header row first, then data rows
    #[schema(value_type = Vec<Vec<Object>>, example = json!([
        ["Employee ID", "Full Name", "Date of Birth"],
        ["EMP2001", "Jane Roe", "1995-06-15"]
    ]))]
    pub rows: Vec<Vec<CellValue>>,
}

/// Import employees
#[utoipa::path(
    post,
    path = "/api/employee/import",
    request_body = EmployeeImportRequest,
    responses(
        (status = 200, description = "Rows processed; created employees and per-row errors", body = Object, example = json!({
            "batchId": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "success": [{
                "employeeId": "EMP2001",
                "internalId": 42,
                "name": "Jane Roe",
                "fields": { "name": "Jane Roe", "DOB": "1995-06-15" },
                "sourceRowNumber": 2
            }],
            "errors": [],
            "totalProcessed": 1,
            "unresolvedColumns": []
        })),
        (status = 422, description = "Empty file or no recognizable headers", body = Object, example = json!({
            "message": "File is empty or missing headers"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee"
)]
pub async fn import_employees(
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    body: web::Json<EmployeeImportRequest>,
) -> actix_web::Result<impl Responder> {
    info!(company_id = body.company_id, rows = body.rows.len(), "Employee import requested");
    let summary = service::import_employees(
        store.get_ref(),
        body.company_id,
        &body.rows,
        &config.import_settings(),
    )
    .await
    .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(summary))
}
