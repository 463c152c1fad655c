//! 产品业务服务

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::model::{Product, ProductDraft, ProductPatch};
use super::repository::ProductRepository;
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        self.repository.list().await
    }

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, CoreError> {
        let draft = draft.normalized();
        if let Err(errors) = draft.validate() {
            warn!("Rejected product create: {}", errors);
            return Err(errors.into());
        }

        let product = self.repository.insert(&draft).await?;
        info!("Created product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, CoreError> {
        self.repository
            .find(id)
            .await?
            .ok_or(CoreError::NotFound(id))
    }

    pub async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<Product, CoreError> {
        let current = self.get_product(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let draft = patch.apply_to(&current).normalized();
        if let Err(errors) = draft.validate() {
            warn!("Rejected update of product {}: {}", id, errors);
            return Err(errors.into());
        }

        // 读取之后可能已被删除
        let product = self
            .repository
            .update(id, &draft)
            .await?
            .ok_or(CoreError::NotFound(id))?;
        info!("Updated product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CoreError> {
        if !self.repository.delete(id).await? {
            return Err(CoreError::NotFound(id));
        }
        info!("Deleted product: {}", id);
        Ok(())
    }

    pub async fn count_products(&self) -> Result<i64, CoreError> {
        self.repository.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::product::repository::MemoryProductRepository;
    use serde_json::json;

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryProductRepository::new()))
    }

    fn draft(name: &str, price: f64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            price,
            available: true,
        }
    }

    fn patch(value: serde_json::Value) -> ProductPatch {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_read_returns_same_fields() {
        let service = service();
        let candidate = draft("Chair", 50.0);

        let created = service.create_product(candidate.clone()).await.unwrap();
        let fetched = service.get_product(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(ProductDraft::from(&fetched), candidate);
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let service = service();
        let created = service.create_product(draft("  Desk ", 10.0)).await.unwrap();
        assert_eq!(created.name, "Desk");
    }

    #[tokio::test]
    async fn test_create_with_negative_price_persists_nothing() {
        let service = service();
        let err = service.create_product(draft("Chair", -5.0)).await.unwrap_err();

        match err {
            CoreError::Validation(fields) => {
                assert_eq!(
                    fields.get("price"),
                    Some(&vec!["price must be a positive number".to_string()])
                );
                assert!(!fields.contains_key("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(service.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_changes_only_submitted_fields() {
        let service = service();
        let created = service.create_product(draft("Chair", 50.0)).await.unwrap();

        let updated = service
            .update_product(created.id, patch(json!({"price": 65.5})))
            .await
            .unwrap();
        let fetched = service.get_product(created.id).await.unwrap();

        assert_eq!(fetched, updated);
        assert_eq!(fetched.price, 65.5);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.available, created.available);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_record() {
        let service = service();
        let created = service.create_product(draft("Chair", 50.0)).await.unwrap();

        let err = service
            .update_product(created.id, patch(json!({"name": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref f) if f.contains_key("name")));

        let unchanged = service.get_product(created.id).await.unwrap();
        assert_eq!(unchanged.name, "Chair");
    }

    #[tokio::test]
    async fn test_empty_update_returns_record_unchanged() {
        let service = service();
        let created = service.create_product(draft("Chair", 50.0)).await.unwrap();
        let same = service
            .update_product(created.id, ProductPatch::default())
            .await
            .unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn test_empty_update_of_missing_product_is_not_found() {
        let service = service();
        let err = service
            .update_product(9, ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let service = service();
        let err = service
            .update_product(9, patch(json!({"price": 1.0})))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let service = service();
        let created = service.create_product(draft("Chair", 50.0)).await.unwrap();

        service.delete_product(created.id).await.unwrap();

        assert!(matches!(
            service.get_product(created.id).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_product(created.id).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_non_decreasing_in_price() {
        let service = service();
        for (name, price) in [("Desk", 150.0), ("Lamp", 20.0), ("Chair", 50.0), ("Rug", 20.0)] {
            service.create_product(draft(name, price)).await.unwrap();
        }

        let products = service.list_products().await.unwrap();
        assert_eq!(products.len(), 4);
        assert!(products.windows(2).all(|w| w[0].price <= w[1].price));
    }
}
