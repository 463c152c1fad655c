//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use super::{
    model::{Product, ProductDraft, ProductPatch},
    service::ProductService,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

/// 产品路由，挂载于 `/api/products` 与 `/products`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn product_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, CoreError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| CoreError::BadRequest(rejection.body_text()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CoreError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| CoreError::BadRequest(rejection.body_text()))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), CoreError> {
    let draft = json_body(payload)?;
    let product = state.product_service.create_product(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, CoreError> {
    let product = state.product_service.get_product(product_id(id)?).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, CoreError> {
    let id = product_id(id)?;
    let patch = json_body(payload)?;
    let product = state.product_service.update_product(id, patch).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, CoreError> {
    state.product_service.delete_product(product_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    let count = state.product_service.count_products().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "storage": {
            "backend": state.product_service.backend(),
            "products_count": count
        },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
