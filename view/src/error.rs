//! 客户端错误类型

use std::collections::BTreeMap;

/// 字段名 -> 校验错误信息
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// 本地或服务端（HTTP 400）校验失败
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("product {0} not found")]
    NotFound(i64),
    /// 无法连接服务端或响应无法解析
    #[error("network error: {0}")]
    Network(String),
    #[error("store returned {status}: {message}")]
    Server { status: u16, message: String },
    /// 对话框未打开时提交
    #[error("dialog is not open")]
    DialogClosed,
}

impl ViewError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ViewError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ViewError {
    fn from(err: reqwest::Error) -> Self {
        ViewError::Network(err.to_string())
    }
}
