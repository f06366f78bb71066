// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermInventoryCreate, PermInventoryEdit, PermInventoryInactivate, RequirePermission},
    },
    models::{
        finance::Reconciliation,
        inventory::{NewProduct, Product, StockAdjustment, StockMovement},
        status::{RecordStatus, StatusChange, StatusFilter},
    },
};

// POST /api/inventory/products
#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Produto criado (com estoque inicial, se informado)", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão de criação no estoque")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermInventoryCreate>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .create_product(&payload, &user.actor)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/inventory/products
#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    params(("status" = Option<RecordStatus>, Query, description = "Filtra por status")),
    responses(
        (status = 200, description = "Lista de produtos", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<RecordStatus>>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products(filter.status).await?;
    Ok(Json(products))
}

// GET /api/inventory/products/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.inventory_service.get_product(product_id).await?;
    Ok(Json(product))
}

// PATCH /api/inventory/products/{id}/status
#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}/status",
    tag = "Inventory",
    request_body = StatusChange,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Status alterado", body = Product),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_product_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermInventoryInactivate>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<StatusChange>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .set_product_status(product_id, payload.status)
        .await?;
    Ok(Json(product))
}

// GET /api/inventory/products/{id}/movements
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Histórico de movimentações", body = Vec<StockMovement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_product_movements(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.inventory_service.list_movements(product_id).await?;
    Ok(Json(movements))
}

// GET /api/inventory/products/{id}/reconciliation
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/reconciliation",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Quantidade em cache x soma das movimentações", body = Reconciliation)
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_product(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.inventory_service.reconcile_product(product_id).await?;
    Ok(Json(report))
}

// POST /api/inventory/adjustments
#[utoipa::path(
    post,
    path = "/api/inventory/adjustments",
    tag = "Inventory",
    request_body = StockAdjustment,
    responses(
        (status = 201, description = "Ajuste registrado", body = StockMovement),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermInventoryEdit>,
    Json(payload): Json<StockAdjustment>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .adjust_stock(&payload, &user.actor)
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}
