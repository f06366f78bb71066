mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::Fixture;
use gestao_backend::{
    models::auth::{Module, ModulePermissions, PermissionSet},
    routes::build_router,
};

fn token(fx: &Fixture, grants: &[(Module, ModulePermissions)]) -> String {
    let permissions: PermissionSet = grants.iter().copied().collect();
    fx.state
        .auth_service
        .issue_token(&fx.actor, permissions, Duration::hours(1))
        .unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_is_public() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());

    let (status, _) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());

    let (status, _) = send(&app, "GET", "/api/inventory/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/inventory/products", Some("nao-e-um-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_needs_the_module_capability() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());
    let payload = json!({ "name": "Linguiça Toscana", "kind": "FOR_SALE", "unit": "kg", "initialStock": "12" });

    let reader = token(&fx, &[(Module::Inventory, ModulePermissions { can_edit: true, ..Default::default() })]);
    let (status, body) = send(&app, "POST", "/api/inventory/products", Some(&reader), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("inventory:create"));

    let creator = token(&fx, &[(Module::Inventory, ModulePermissions { can_create: true, ..Default::default() })]);
    let (status, body) = send(&app, "POST", "/api/inventory/products", Some(&creator), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], "12");
    assert_eq!(body["status"], "ACTIVE");
}

#[tokio::test]
async fn invalid_payload_is_bad_request_with_field_details() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());
    let admin = token(&fx, &[(Module::Finance, ModulePermissions::all())]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/finance/accounts",
        Some(&admin),
        Some(json!({ "name": "", "initialBalance": "-5" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["initial_balance"].is_array());
}

#[tokio::test]
async fn installment_purchase_over_http_creates_pending_payables() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());
    let supplier = fx.supplier().await;
    let account = fx.account("Conta Principal", dec!(1000)).await;
    let product = fx.product("Carcaça", dec!(0), dec!(10)).await;

    let buyer = token(
        &fx,
        &[
            (Module::Purchases, ModulePermissions { can_create: true, ..Default::default() }),
            (Module::Finance, ModulePermissions::default()),
        ],
    );

    let (status, purchase) = send(
        &app,
        "POST",
        "/api/purchases",
        Some(&buyer),
        Some(json!({
            "supplierId": supplier.id,
            "accountId": account.id,
            "date": "2025-01-10",
            "items": [{ "productId": product.id, "quantity": "3", "unitCost": "300" }],
            "paymentTerms": "A_PRAZO",
            "numeroParcelas": 3,
            "firstDueDate": "2025-02-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(purchase["total"], "900");

    let (status, payables) = send(&app, "GET", "/api/finance/payables?status=PENDING", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    let payables = payables.as_array().unwrap();
    assert_eq!(payables.len(), 3);
    assert_eq!(payables[0]["installment"], "1/3");
    assert_eq!(payables[0]["dueDate"], "2025-02-10");
    assert_eq!(payables[2]["dueDate"], "2025-04-10");
}

#[tokio::test]
async fn insufficient_stock_is_a_conflict() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());
    let account = fx.account("Caixa", dec!(0)).await;
    let product = fx.product("Picanha", dec!(5), dec!(40)).await;
    let seller = token(&fx, &[(Module::Sales, ModulePermissions { can_create: true, ..Default::default() })]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&seller),
        Some(json!({
            "accountId": account.id,
            "items": [{ "productId": product.id, "quantity": "10", "unitPrice": "70" }],
            "paymentTerms": "A_VISTA"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["available"], "5");
    assert_eq!(body["requested"], "10");
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let fx = Fixture::new();
    let app = build_router(fx.state.clone());
    let any = token(&fx, &[]);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/inventory/products/{}", uuid::Uuid::new_v4()),
        Some(&any),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
