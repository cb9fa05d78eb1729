//! HTTP error mapping
//!
//! Every handler and middleware stage fails with [`ApiError`]; the response
//! body is always `{"error": "<message>"}`.

use crate::auth::jwt::TokenError;
use crate::db::StoreError;
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    DuplicateUsername,
    /// Unknown username and wrong password deliberately share this variant.
    InvalidCredentials,
    MissingToken,
    InvalidToken(TokenError),
    Forbidden,
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateUsername
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::MissingToken | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details never leave the process.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::DuplicateUsername => "Username already exists".to_string(),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::MissingToken => "Missing or malformed authorization header".to_string(),
            ApiError::InvalidToken(_) => "Invalid or expired token".to_string(),
            ApiError::Forbidden => "Insufficient permissions".to_string(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => ApiError::DuplicateUsername,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => ApiError::Internal(err.into()),
            other => ApiError::InvalidToken(other),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => error!("Internal error: {:#}", err),
            ApiError::InvalidToken(reason) => warn!(%reason, "Rejected token"),
            _ => {}
        }

        let body = Json(json!({
            "error": self.message(),
        }));

        (self.status(), body).into_response()
    }
}
