use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] DbErr),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Validation error: {0}")] Validation(String),

    #[error("Token not found")]
    TokenNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")] Internal(String),
}

impl AppError {
    /// Save-hook rejections travel through sea-orm as `DbErr::Custom`; surface
    /// them as validation failures instead of generic database errors.
    pub fn from_save(err: DbErr) -> Self {
        match err {
            DbErr::Custom(msg) => AppError::Validation(msg),
            other => AppError::Database(other),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string()),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::TokenNotFound => ("TOKEN_NOT_FOUND", "Token not found".to_string()),
            AppError::UserNotFound => ("USER_NOT_FOUND", "User not found".to_string()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::TokenNotFound | AppError::UserNotFound => axum::http::StatusCode::NOT_FOUND,
            AppError::Validation(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
