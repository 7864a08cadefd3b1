use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::api::ApiError;
use crate::config::Config;
use crate::import::error::BatchError;
use crate::import::service::{self, PayrunImport};
use crate::model::import::CellValue;
use crate::model::payroll::{PayrunCalculation, PayrunPeriod, PayrunSummary};
use crate::store::MySqlStore;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrunImportRequest {
    #[schema(example = 7)]
    pub company_id: u64,
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    /// Replace payruns already stored for the month instead of refusing
    #[serde(default)]
    pub replace_existing: bool,
    /// Extracted sheet: header row first, then data rows
    #[schema(value_type = Vec<Vec<Object>>, example = json!([["Employee ID", "Present Days"], ["EMP1001", 22]]))]
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrunQuery {
    #[schema(example = 7)]
    pub company_id: u64,
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct PayrunListResponse {
    pub data: Vec<PayrunCalculation>,
    #[schema(example = 10)]
    pub total: usize,
}

fn period(month: &str, year: i32) -> Result<PayrunPeriod, ApiError> {
    PayrunPeriod::parse(month, year).ok_or_else(|| {
        ApiError::Batch(BatchError::InvalidPeriod(format!("{month} {year}")))
    })
}

#[utoipa::path(
    post,
    path = "/api/payrun/import",
    request_body = PayrunImportRequest,
    responses(
        (status = 200, description = "Rows processed; accepted payruns and per-row errors", body = Object, example = json!({
            "batchId": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "success": [{
                "row": { "employeeId": "EMP1001", "internalId": 1, "fields": { "empId": "EMP1001", "presentDays": 22 }, "sourceRowNumber": 2 },
                "calculation": { "employeeCode": "EMP1001", "month": "January", "year": 2026, "finalNetpay": 23498.39 }
            }],
            "errors": [{
                "sourceRowNumber": 3,
                "employeeId": "EMP1002",
                "messages": ["Row 3: presentDays is required"],
                "kinds": ["FieldRequired"]
            }],
            "totalProcessed": 2,
            "unresolvedColumns": ["otHours"]
        })),
        (status = 409, description = "Payruns already exist for the month", body = Object, example = json!({
            "message": "Payrun data already exists for January 2026"
        })),
        (status = 422, description = "Empty file or no recognizable headers", body = Object, example = json!({
            "message": "File is empty or missing headers"
        }))
    ),
    tag = "Payrun"
)]
pub async fn import_payrun(
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    body: web::Json<PayrunImportRequest>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let request = PayrunImport {
        company_id: body.company_id,
        period: period(&body.month, body.year)?,
        replace_existing: body.replace_existing,
        grid: body.rows,
    };
    info!(
        company_id = request.company_id,
        period = %request.period,
        rows = request.grid.len(),
        "Payrun import requested"
    );

    let summary = service::import_payrun(store.get_ref(), &request, &config.import_settings())
        .await
        .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/payrun",
    params(PayrunQuery),
    responses(
        (status = 200, description = "Stored payruns with active benefits applied", body = PayrunListResponse),
        (status = 422, description = "Unknown month")
    ),
    tag = "Payrun"
)]
pub async fn list_payruns(
    store: web::Data<MySqlStore>,
    query: web::Query<PayrunQuery>,
) -> actix_web::Result<impl Responder> {
    let period = period(&query.month, query.year)?;
    let data = service::list_payruns(store.get_ref(), query.company_id, period)
        .await
        .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(PayrunListResponse {
        total: data.len(),
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/api/payrun/summary",
    params(PayrunQuery),
    responses(
        (status = 200, description = "Period totals with active benefits applied", body = PayrunSummary),
        (status = 422, description = "Unknown month")
    ),
    tag = "Payrun"
)]
pub async fn payrun_summary(
    store: web::Data<MySqlStore>,
    query: web::Query<PayrunQuery>,
) -> actix_web::Result<impl Responder> {
    let period = period(&query.month, query.year)?;
    let summary = service::summarize_payruns(store.get_ref(), query.company_id, period)
        .await
        .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_request_accepts_mixed_cells() {
        let req: PayrunImportRequest = serde_json::from_str(
            r#"{
                "companyId": 7,
                "month": "jan",
                "year": 2026,
                "rows": [["Employee ID", "Present Days", "Joined"], ["EMP1001", 22, 44927], ["EMP1002", null, true]]
            }"#,
        )
        .unwrap();
        assert!(!req.replace_existing);
        assert_eq!(req.rows[1][1], CellValue::Number(22.0));
        assert_eq!(req.rows[2][1], CellValue::Empty);
        assert_eq!(req.rows[2][2], CellValue::Bool(true));
        assert_eq!(period(&req.month, req.year).unwrap().to_string(), "January 2026");
    }

    #[test]
    fn test_bad_month_is_rejected() {
        assert!(matches!(
            period("Smarch", 2026),
            Err(ApiError::Batch(BatchError::InvalidPeriod(_)))
        ));
    }
}
