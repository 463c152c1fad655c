//! 产品存储

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::model::{Product, ProductDraft};
use crate::core::error::CoreError;

/// 产品存储接口，传入的 draft 均已通过校验
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 健康检查中显示的后端名称
    fn backend(&self) -> &'static str;

    /// 全部产品，按价格升序，价格相同按 id 升序
    async fn list(&self) -> Result<Vec<Product>, CoreError>;

    async fn insert(&self, draft: &ProductDraft) -> Result<Product, CoreError>;

    async fn find(&self, id: i64) -> Result<Option<Product>, CoreError>;

    /// 覆盖全部可变字段；不存在时返回 `None`
    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>, CoreError>;

    /// 不存在时返回 `false`
    async fn delete(&self, id: i64) -> Result<bool, CoreError>;

    async fn count(&self) -> Result<i64, CoreError>;
}

/// 内存存储，用于测试与本地开发
pub struct MemoryProductRepository {
    products: RwLock<BTreeMap<i64, Product>>,
    next_id: AtomicI64,
}

impl Default for MemoryProductRepository {
    fn default() -> Self {
        Self {
            products: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    async fn list(&self) -> Result<Vec<Product>, CoreError> {
        let products = self.products.read().await;
        // BTreeMap 按 id 有序，稳定排序后同价按 id
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(all)
    }

    async fn insert(&self, draft: &ProductDraft) -> Result<Product, CoreError> {
        let mut products = self.products.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let product = Product {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            available: draft.available,
            created_at: now,
            updated_at: now,
        };
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, CoreError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>, CoreError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        product.name = draft.name.clone();
        product.description = draft.description.clone();
        product.price = draft.price;
        product.available = draft.available;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, CoreError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, CoreError> {
        Ok(self.products.read().await.len() as i64)
    }
}

#[cfg(feature = "database")]
pub use postgres::PgProductRepository;

#[cfg(feature = "database")]
mod postgres {
    use async_trait::async_trait;
    use sqlx::PgPool;
    use tracing::info;

    use super::ProductRepository;
    use crate::app::product::model::{Product, ProductDraft};
    use crate::core::error::CoreError;

    /// PostgreSQL 存储（`products` 表）
    pub struct PgProductRepository {
        pool: PgPool,
    }

    impl PgProductRepository {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }

        /// 创建 `products` 表（如不存在）
        pub async fn ensure_schema(&self) -> Result<(), CoreError> {
            info!("Ensuring products table exists...");

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    id          BIGSERIAL PRIMARY KEY,
                    name        TEXT NOT NULL CHECK (length(btrim(name)) > 0),
                    description TEXT,
                    price       DOUBLE PRECISION NOT NULL CHECK (price > 0),
                    available   BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            )
            .execute(&self.pool)
            .await?;

            sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_price ON products (price, id)")
                .execute(&self.pool)
                .await?;

            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepository for PgProductRepository {
        fn backend(&self) -> &'static str {
            "postgres"
        }

        async fn list(&self) -> Result<Vec<Product>, CoreError> {
            let products =
                sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY price ASC, id ASC")
                    .fetch_all(&self.pool)
                    .await?;
            Ok(products)
        }

        async fn insert(&self, draft: &ProductDraft) -> Result<Product, CoreError> {
            let product = sqlx::query_as::<_, Product>(
                "INSERT INTO products (name, description, price, available) VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.available)
            .fetch_one(&self.pool)
            .await?;
            Ok(product)
        }

        async fn find(&self, id: i64) -> Result<Option<Product>, CoreError> {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(product)
        }

        async fn update(
            &self,
            id: i64,
            draft: &ProductDraft,
        ) -> Result<Option<Product>, CoreError> {
            let product = sqlx::query_as::<_, Product>(
                r#"
                UPDATE products
                SET name = $1, description = $2, price = $3, available = $4, updated_at = NOW()
                WHERE id = $5
                RETURNING *
                "#,
            )
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.available)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(product)
        }

        async fn delete(&self, id: i64) -> Result<bool, CoreError> {
            let result = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn count(&self) -> Result<i64, CoreError> {
            let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
                .fetch_one(&self.pool)
                .await?;
            Ok(count.0)
        }
    }
}
