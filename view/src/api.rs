//! 产品服务客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FieldErrors, ViewError};
use crate::model::{Product, ProductForm};

#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ViewError>;

    async fn create(&self, form: &ProductForm) -> Result<Product, ViewError>;

    async fn get(&self, id: i64) -> Result<Product, ViewError>;

    async fn update(&self, id: i64, form: &ProductForm) -> Result<Product, ViewError>;

    async fn delete(&self, id: i64) -> Result<(), ViewError>;
}

/// 服务端错误响应
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    fields: Option<FieldErrors>,
}

/// `/api/products` 的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct HttpProductClient {
    client: Client,
    collection_url: String,
}

impl HttpProductClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// `base_url` 为服务根地址，如 `http://127.0.0.1:3000`
    pub fn new(base_url: &str) -> Result<Self, ViewError> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ViewError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            collection_url: format!("{}/api/products", base_url.trim_end_matches('/')),
        })
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    async fn check(response: Response, id: Option<i64>) -> Result<Response, ViewError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        debug!("store rejected request with {}: {}", status, body.message);

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(ViewError::NotFound(id)),
            (StatusCode::BAD_REQUEST, _) => {
                let fields = body.fields.unwrap_or_else(|| {
                    let mut fields = FieldErrors::new();
                    fields.insert("form".to_string(), vec![body.message.clone()]);
                    fields
                });
                Err(ViewError::Validation(fields))
            }
            _ => Err(ViewError::Server {
                status: status.as_u16(),
                message: body.message,
            }),
        }
    }
}

#[async_trait]
impl ProductApi for HttpProductClient {
    async fn list(&self) -> Result<Vec<Product>, ViewError> {
        let response = self.client.get(&self.collection_url).send().await?;
        Ok(Self::check(response, None).await?.json().await?)
    }

    async fn create(&self, form: &ProductForm) -> Result<Product, ViewError> {
        let response = self
            .client
            .post(&self.collection_url)
            .json(form)
            .send()
            .await?;
        Ok(Self::check(response, None).await?.json().await?)
    }

    async fn get(&self, id: i64) -> Result<Product, ViewError> {
        let response = self.client.get(self.item_url(id)).send().await?;
        Ok(Self::check(response, Some(id)).await?.json().await?)
    }

    async fn update(&self, id: i64, form: &ProductForm) -> Result<Product, ViewError> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(form)
            .send()
            .await?;
        Ok(Self::check(response, Some(id)).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ViewError> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
