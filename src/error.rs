use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::{Validate, ValidationErrors};

/// A message scoped to one request field, as returned in validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 403.
    #[error("Invalid API key.")]
    InvalidApiKey,

    /// HTTP 401.
    #[error("Authentication required.")]
    Unauthenticated,

    /// HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// HTTP 422, every field error of the request at once.
    #[error("Validation failed.")]
    Validation(Vec<FieldError>),

    /// HTTP 500. Logged, never shown to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidApiKey => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "status": false,
                "code": status.as_u16(),
                "message": self.to_string(),
                "errors": errors,
            }),
            ApiError::Internal(err) => {
                error!(error = ?err, "request failed");
                json!({
                    "status": false,
                    "code": status.as_u16(),
                    "message": "Internal server error.",
                })
            }
            _ => json!({
                "status": false,
                "code": status.as_u16(),
                "message": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Run the derived validators and return every failure, sorted by field.
pub fn field_errors<T: Validate>(value: &T) -> Vec<FieldError> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(&errors),
    }
}

fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(&field.to_string());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

// Field names reach us in Rust spelling; clients know the camelCase one.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Payload {
        #[validate(required(message = "blank"), length(min = 1, message = "blank"))]
        device_identifier: Option<String>,
        #[validate(range(min = 0, message = "negative"))]
        badge_number: i64,
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(ApiError::InvalidApiKey.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation(Vec::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn collects_all_field_errors_in_camel_case() {
        let errors = field_errors(&Payload {
            device_identifier: None,
            badge_number: -1,
        });
        assert_eq!(
            errors,
            vec![
                FieldError::new("badgeNumber", "negative"),
                FieldError::new("deviceIdentifier", "blank"),
            ]
        );
    }

    #[test]
    fn valid_payload_has_no_errors() {
        let errors = field_errors(&Payload {
            device_identifier: Some("dev-1".into()),
            badge_number: 0,
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn camel_case_is_idempotent() {
        assert_eq!(camel_case("device_identifier"), "deviceIdentifier");
        assert_eq!(camel_case("deviceIdentifier"), "deviceIdentifier");
    }

    #[test]
    fn internal_error_hides_details() {
        let resp = ApiError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
