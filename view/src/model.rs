//! 客户端产品模型与表单

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::FieldErrors;

/// 本地副本中的产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(default)]
    pub available: bool,
}

/// 将接口返回的价格转换为数值
///
/// 数字原样保留，数字字符串会被解析，其余情况（包括 NaN 与无穷大）均为 `0.0`
pub fn coerce_price(value: &Value) -> f64 {
    let price = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if price.is_finite() {
        price
    } else {
        0.0
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| coerce_price(&value))
}

/// 新建/编辑对话框的表单草稿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct ProductForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "price must be a positive number"))]
    pub price: f64,
    pub available: bool,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("name must not be empty"));
        return Err(error);
    }
    Ok(())
}

impl ProductForm {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// 从文本输入设置价格，转换规则与加载时一致
    pub fn set_price_text(&mut self, text: &str) {
        self.price = coerce_price(&Value::String(text.to_string()));
    }

    /// 返回每个不合法字段的错误信息
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|errors| {
            errors
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
                .collect()
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            available: product.available,
        }
    }
}
