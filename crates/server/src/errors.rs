use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

pub const MSG_INVALID_ID: &str = "ID inválido";
pub const MSG_EMPTY_CHANGESET: &str = "No se enviaron campos para actualizar";
pub const MSG_NOT_FOUND: &str = "Caballero no encontrado";
pub const MSG_INTERNAL: &str = "Error interno del servidor";

/// Handler errors; every variant renders as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Body extraction failed; keeps axum's status (400/415/422).
    #[error("rejected body ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        if e.is_client_error() {
            warn!(code, error = %e, "request rejected");
        } else {
            // 不向客户端暴露驱动错误，只记日志
            error!(code, error = %e, "internal error");
        }
        match e {
            ServiceError::InvalidIdentifier(_) => ApiError::BadRequest(MSG_INVALID_ID.into()),
            ServiceError::EmptyChangeset => ApiError::BadRequest(MSG_EMPTY_CHANGESET.into()),
            ServiceError::NotFound(_) => ApiError::NotFound(MSG_NOT_FOUND.into()),
            ServiceError::Db(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected { status: rejection.status(), detail: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Rejected { detail, .. } => detail,
            ApiError::Internal(_) => MSG_INTERNAL.to_string(),
        };
        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database setup failed: {0}")]
    Database(String),
}
