//! 应用层

pub mod product;

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::core::middleware::request_logging_middleware;
use product::handler::{self, AppState};
use product::ProductService;

/// 构建完整路由：`/api/products`、别名 `/products` 与 `/health`
pub fn build_router(product_service: ProductService, timeout: Duration) -> Router {
    let state = AppState { product_service };

    Router::new()
        .route("/health", get(handler::health_check))
        .nest("/api/products", handler::routes())
        .nest("/products", handler::routes())
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
