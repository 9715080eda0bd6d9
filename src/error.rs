use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Remote(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid input")]
    FieldErrors(#[from] validator::ValidationErrors),
    #[error("{0}")]
    LimitReached(String),
    #[error("You are not part of any company")]
    NoCompany,
    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Remote(format!("Backend request failed: {}", e))
    }
}

impl AppError {
    /// True for errors that mean the code reached a state it should never reach.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, AppError::UnknownTier(_) | AppError::UnknownChannel(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Remote(msg) => {
                error!("Backend call failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::FieldErrors(errors) => {
                let body = Json(json!({
                    "success": false,
                    "error": "Please correct the highlighted fields",
                    "fields": field_messages(errors),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::LimitReached(msg) => (StatusCode::PAYMENT_REQUIRED, msg.clone()),
            AppError::NoCompany => (StatusCode::CONFLICT, self.to_string()),
            AppError::UnknownTier(_) | AppError::UnknownChannel(_) => {
                error!("Invariant violated: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

fn field_messages(errors: &validator::ValidationErrors) -> Value {
    let mut fields = Map::new();
    for (field, errs) in errors.field_errors() {
        let message = errs
            .iter()
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| format!("{} is invalid", field));
        fields.insert(field.to_string(), Value::String(message));
    }
    Value::Object(fields)
}
