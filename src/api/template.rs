use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::api::{ApiError, parse_domain};
use crate::import::service::load_template;
use crate::import::template::{
    add_custom_column, add_system_column, check_template, remove_column, rename_column,
    sample_grid,
};
use crate::model::template::{ImportDomain, TemplateColumn};
use crate::store::{MySqlStore, TemplateStore};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    #[schema(example = 7)]
    pub company_id: u64,
    pub domain: ImportDomain,
    pub columns: Vec<TemplateColumn>,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveTemplate {
    pub columns: Vec<TemplateColumn>,
}

/// Either a new custom column (`displayName`) or a removed default column
/// brought back (`systemKey`).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddColumn {
    #[schema(example = "Shift Code")]
    pub display_name: Option<String>,
    #[schema(example = "otHours")]
    pub system_key: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameColumn {
    #[schema(example = "Days Worked")]
    pub display_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct SampleResponse {
    /// Header row followed by one example row
    #[schema(value_type = Vec<Vec<Object>>, example = json!([["Employee ID", "Present Days"], ["EMP1001", 22]]))]
    pub rows: Vec<Vec<crate::model::import::CellValue>>,
}

fn respond(company_id: u64, domain: ImportDomain, columns: Vec<TemplateColumn>) -> HttpResponse {
    HttpResponse::Ok().json(TemplateResponse {
        company_id,
        domain,
        columns,
    })
}

#[utoipa::path(
    get,
    path = "/api/template/{company_id}/{domain}",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`")
    ),
    responses(
        (status = 200, description = "Active template, saved columns merged with the defaults", body = TemplateResponse),
        (status = 400, description = "Unknown domain", body = Object, example = json!({
            "message": "unknown import domain `leave`"
        }))
    ),
    tag = "Template"
)]
pub async fn get_template(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain) = path.into_inner();
    let domain = parse_domain(&domain)?;
    let columns = load_template(store.get_ref(), company_id, domain)
        .await
        .map_err(ApiError::from)?;
    Ok(respond(company_id, domain, columns))
}

#[utoipa::path(
    put,
    path = "/api/template/{company_id}/{domain}",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`")
    ),
    request_body = SaveTemplate,
    responses(
        (status = 200, description = "Template saved", body = Object, example = json!({
            "message": "Template saved"
        })),
        (status = 409, description = "Duplicate column key"),
        (status = 400, description = "Empty column name or a changed system column", body = Object, example = json!({
            "message": "`presentDays` is a system column; only its display name and position can change"
        }))
    ),
    tag = "Template"
)]
pub async fn save_template(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String)>,
    body: web::Json<SaveTemplate>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain) = path.into_inner();
    let domain = parse_domain(&domain)?;
    check_template(domain, &body.columns).map_err(ApiError::from)?;
    store
        .save(company_id, domain, &body.columns)
        .await
        .map_err(ApiError::from)?;
    info!(company_id, %domain, columns = body.columns.len(), "Template replaced");
    Ok(HttpResponse::Ok().json(json!({ "message": "Template saved" })))
}

#[utoipa::path(
    post,
    path = "/api/template/{company_id}/{domain}/columns",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`")
    ),
    request_body = AddColumn,
    responses(
        (status = 201, description = "Column added; returns the updated template", body = TemplateResponse),
        (status = 409, description = "Key already present", body = Object, example = json!({
            "message": "column key `custom_shift_code` already exists in the template"
        })),
        (status = 404, description = "Not a default column of the domain")
    ),
    tag = "Template"
)]
pub async fn add_column(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String)>,
    body: web::Json<AddColumn>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain) = path.into_inner();
    let domain = parse_domain(&domain)?;
    let mut columns = load_template(store.get_ref(), company_id, domain)
        .await
        .map_err(ApiError::from)?;

    let key = match (&body.display_name, &body.system_key) {
        (_, Some(key)) => {
            add_system_column(&mut columns, domain, key).map_err(ApiError::from)?;
            key.clone()
        }
        (Some(name), None) => add_custom_column(&mut columns, name).map_err(ApiError::from)?,
        (None, None) => {
            return Err(ApiError::BadRequest("displayName or systemKey is required".into()).into());
        }
    };
    store
        .save(company_id, domain, &columns)
        .await
        .map_err(ApiError::from)?;
    info!(company_id, %domain, key = %key, "Template column added");

    Ok(HttpResponse::Created().json(TemplateResponse {
        company_id,
        domain,
        columns,
    }))
}

#[utoipa::path(
    put,
    path = "/api/template/{company_id}/{domain}/columns/{key}",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`"),
        ("key", Path, description = "Column key")
    ),
    request_body = RenameColumn,
    responses(
        (status = 200, description = "Header text changed", body = TemplateResponse),
        (status = 404, description = "No such column")
    ),
    tag = "Template"
)]
pub async fn rename_template_column(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String, String)>,
    body: web::Json<RenameColumn>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain, key) = path.into_inner();
    let domain = parse_domain(&domain)?;
    let mut columns = load_template(store.get_ref(), company_id, domain)
        .await
        .map_err(ApiError::from)?;
    rename_column(&mut columns, &key, &body.display_name).map_err(ApiError::from)?;
    store
        .save(company_id, domain, &columns)
        .await
        .map_err(ApiError::from)?;
    Ok(respond(company_id, domain, columns))
}

#[utoipa::path(
    delete,
    path = "/api/template/{company_id}/{domain}/columns/{key}",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`"),
        ("key", Path, description = "Column key")
    ),
    responses(
        (status = 200, description = "Column removed", body = TemplateResponse),
        (status = 400, description = "Required system column", body = Object, example = json!({
            "message": "`presentDays` is a required system column and cannot be removed"
        })),
        (status = 404, description = "No such column")
    ),
    tag = "Template"
)]
pub async fn delete_template_column(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String, String)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain, key) = path.into_inner();
    let domain = parse_domain(&domain)?;
    let mut columns = load_template(store.get_ref(), company_id, domain)
        .await
        .map_err(ApiError::from)?;
    remove_column(&mut columns, &key).map_err(ApiError::from)?;
    store
        .save(company_id, domain, &columns)
        .await
        .map_err(ApiError::from)?;
    info!(company_id, %domain, key = %key, "Template column removed");
    Ok(respond(company_id, domain, columns))
}

#[utoipa::path(
    get,
    path = "/api/template/{company_id}/{domain}/sample",
    params(
        ("company_id", Path, description = "Company ID"),
        ("domain", Path, description = "`employee` or `payrun`")
    ),
    responses(
        (status = 200, description = "Header row and one sample row", body = SampleResponse)
    ),
    tag = "Template"
)]
pub async fn template_sample(
    store: web::Data<MySqlStore>,
    path: web::Path<(u64, String)>,
) -> actix_web::Result<impl Responder> {
    let (company_id, domain) = path.into_inner();
    let domain = parse_domain(&domain)?;
    let columns = load_template(store.get_ref(), company_id, domain)
        .await
        .map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(SampleResponse {
        rows: sample_grid(domain, &columns),
    }))
}
