//! 核心错误处理模块

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// 字段名 -> 校验错误信息
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(FieldErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("product {0} not found")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) | CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .flat_map(|(_, messages)| messages.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|error| {
                        error
                            .message
                            .as_ref()
                            .map(|msg| msg.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        CoreError::Validation(fields)
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    pub timestamp: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, user_message, fields) = match self {
            CoreError::Validation(fields) => {
                ("VALIDATION_ERROR", summarize(&fields), Some(fields))
            }
            CoreError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            CoreError::NotFound(id) => ("NOT_FOUND", format!("product {} not found", id), None),
            CoreError::Storage(e) => {
                error!("Storage error: {}", e);
                ("INTERNAL_SERVER_ERROR", "storage error".to_string(), None)
            }
        };

        let error_response = ErrorResponse {
            error: error_code.to_string(),
            message: user_message,
            code: status.as_u16(),
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}
