use std::borrow::Cow;
use std::collections::BTreeMap;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::mailer::MailError;

/// Clé utilisée pour les erreurs qui ne portent pas sur un champ précis
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub type ApiResult<T> = Result<T, ApiError>;

/// Erreur unique de l'API, convertie en réponse JSON par actix
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("Authentication credentials were not provided or are invalid")]
    NotAuthenticated,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("{0}")]
    Conflict(String),

    #[error("mail delivery failed: {0}")]
    Mail(#[from] MailError),

    #[error("database error: {0}")]
    Database(DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Erreur de validation sur un seul champ
    pub fn field(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        let mut errors = ValidationErrors::new();
        add_error(&mut errors, field, message);
        ApiError::Validation(errors)
    }

    /// Erreur de validation globale (non_field_errors)
    pub fn non_field(message: impl Into<Cow<'static, str>>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    fn log(&self) {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "Database error"),
            ApiError::Internal(msg) => tracing::error!(message = %msg, "Internal error"),
            ApiError::Mail(e) => tracing::error!(error = %e, "Mail delivery error"),
            ApiError::PermissionDenied => tracing::info!("Permission denied"),
            _ => tracing::debug!(error = %self, "Request rejected"),
        }
    }
}

/// Ajoute un message d'erreur sur un champ
pub fn add_error(errors: &mut ValidationErrors, field: &'static str, message: impl Into<Cow<'static, str>>) {
    let mut error = ValidationError::new("invalid");
    error.message = Some(message.into());
    errors.add(field, error);
}

/// Corps JSON d'une erreur de validation : {"champ": ["message", ...]}
fn validation_body(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "Unique constraint violation");
                ApiError::Conflict("A record with the same unique value already exists".to_string())
            }
            _ => ApiError::Database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Mail(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let mut response = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(errors) => response.json(validation_body(errors)),
            // On ne divulgue pas le détail des erreurs internes
            ApiError::Mail(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                response.json(serde_json::json!({ "detail": "Internal server error" }))
            }
            _ => response.json(serde_json::json!({ "detail": self.to_string() })),
        }
    }
}

// Handlers d'erreurs des extracteurs actix (corps JSON, query string, path)

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        // Un id non numérique ne peut désigner aucune ressource
        PathError::Deserialize(_) => ApiError::NotFound("resource").into(),
        _ => ApiError::BadRequest(err.to_string()).into(),
    }
}
