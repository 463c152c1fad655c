use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use product_catalog::{build_router, MemoryProductRepository, Product, ProductService};
use serde_json::{json, Value};
use tower::ServiceExt;

fn make_app() -> Router {
    let service = ProductService::new(Arc::new(MemoryProductRepository::new()));
    build_router(service, Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn create(app: &Router, body: Value) -> Product {
    let (status, bytes) = send(app, Method::POST, "/api/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_starts_empty() {
    let app = make_app();
    let (status, body) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_slice(&body).unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_create_read_update_delete_cycle() {
    let app = make_app();

    let created = create(
        &app,
        json!({"id": 500, "name": "Chair", "description": "Oak", "price": 50, "available": true}),
    )
    .await;
    assert_ne!(created.id, 500);
    assert_eq!(created.name, "Chair");
    assert_eq!(created.price, 50.0);

    let uri = format!("/api/products/{}", created.id);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Product = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched, created);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"price": 55.5}))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Product = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.price, 55.5);
    assert_eq!(updated.name, "Chair");
    assert_eq!(updated.description.as_deref(), Some("Oak"));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "NOT_FOUND");
    assert_eq!(error["code"], 404);
}

#[tokio::test]
async fn test_create_validation_names_fields() {
    let app = make_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({"name": "", "price": -5})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "VALIDATION_ERROR");
    assert_eq!(error["fields"]["price"][0], "price must be a positive number");
    assert_eq!(error["fields"]["name"][0], "name must not be empty");

    let (_, body) = send(&app, Method::GET, "/api/products", None).await;
    let products: Vec<Product> = serde_json::from_slice(&body).unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = make_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({"name": "Chair"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let app = make_app();
    let (status, _) = send(&app, Method::PUT, "/api/products/77", Some(json!({"price": 3}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/products/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_update_checks_the_id_first() {
    let app = make_app();
    for body in [json!({}), json!({"quantity": 4})] {
        let (status, _) = send(&app, Method::PUT, "/api/products/999", Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let created = create(&app, json!({"name": "Chair", "price": 50})).await;
    let uri = format!("/api/products/{}", created.id);
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let same: Product = serde_json::from_slice(&body).unwrap();
    assert_eq!(same, created);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = make_app();
    let (status, _) = send(&app, Method::GET, "/api/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_sorted_by_price_on_both_mounts() {
    let app = make_app();
    create(&app, json!({"name": "Desk", "price": 150})).await;
    create(&app, json!({"name": "Lamp", "price": 20.25})).await;
    create(&app, json!({"name": "Chair", "price": 50})).await;

    for uri in ["/api/products", "/products"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let products: Vec<Product> = serde_json::from_slice(&body).unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Lamp", "Chair", "Desk"]);
    }
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = make_app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"]["backend"], "in-memory");
    assert_eq!(health["storage"]["products_count"], 0);
}
