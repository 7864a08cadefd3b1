use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::import::error::{BatchError, TemplateError};
use crate::model::template::ImportDomain;
use crate::store::StoreError;

pub mod employee;
pub mod payrun;
pub mod template;

/// Every way a request can fail, rendered as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Batch(BatchError),
    #[display(fmt = "{}", _0)]
    Template(TemplateError),
    #[display(fmt = "{}", _0)]
    Store(StoreError),
    #[display(fmt = "{}", _0)]
    BadRequest(String),
}

impl std::error::Error for ApiError {}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Store(e) => ApiError::Store(e),
            other => ApiError::Batch(other),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        ApiError::Template(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Batch(BatchError::PeriodAlreadyImported(_)) => StatusCode::CONFLICT,
            ApiError::Batch(BatchError::Store(_)) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Batch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Template(TemplateError::DuplicateKey(_)) => StatusCode::CONFLICT,
            ApiError::Template(TemplateError::UnknownColumn(_)) => StatusCode::NOT_FOUND,
            ApiError::Template(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
            return HttpResponse::build(status).json(json!({
                "message": "Something went wrong, Contact with system admin"
            }));
        }
        HttpResponse::build(status).json(json!({ "message": self.to_string() }))
    }
}

pub(crate) fn parse_domain(raw: &str) -> Result<ImportDomain, ApiError> {
    raw.parse::<ImportDomain>()
        .map_err(|_| ApiError::BadRequest(format!("unknown import domain `{raw}`")))
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let conflict = ApiError::from(BatchError::PeriodAlreadyImported("January 2026".into()));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(BatchError::EmptyGrid).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(TemplateError::ProtectedField("empId".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(TemplateError::UnknownColumn("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        let store = ApiError::from(BatchError::Store(StoreError::Corrupt("bad json".into())));
        assert!(matches!(store, ApiError::Store(_)));
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_message_body() {
        let resp = ApiError::from(BatchError::EmptyGrid).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "File is empty or missing headers");

        let resp = ApiError::Store(StoreError::Corrupt("x".into())).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Something went wrong, Contact with system admin");
    }

    #[test]
    fn test_parse_domain() {
        assert_eq!(parse_domain("payrun").unwrap(), ImportDomain::Payrun);
        assert_eq!(parse_domain("employee").unwrap(), ImportDomain::Employee);
        assert!(matches!(parse_domain("leave"), Err(ApiError::BadRequest(_))));
    }
}
