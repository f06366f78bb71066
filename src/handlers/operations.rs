// src/handlers/operations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermProductionCreate, PermProductionInactivate, PermPurchasesCreate, PermPurchasesInactivate,
            PermSalesCreate, PermSalesInactivate, RequirePermission,
        },
    },
    models::{
        operations::{NewProductionRun, NewPurchase, NewSale, NewSlaughter, ProductionRun, Purchase, Sale, Slaughter},
        status::{SaleStatus, StatusChange, StatusFilter},
    },
};

// =============================================================================
//  COMPRAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = NewPurchase,
    responses(
        (status = 201, description = "Compra registrada com estoque, banco e contas a pagar", body = Purchase),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fornecedor, conta ou produto inexistente"),
        (status = 409, description = "Saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_purchase(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermPurchasesCreate>,
    Json(payload): Json<NewPurchase>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let purchase = app_state
        .purchase_service
        .register_purchase(&payload, &user.actor)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    responses((status = 200, description = "Compras", body = Vec<Purchase>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.purchase_service.list_purchases().await?))
}

#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    responses(
        (status = 200, description = "Compra", body = Purchase),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.purchase_service.get_purchase(purchase_id).await?))
}

// Cancelar NÃO estorna estoque nem financeiro
#[utoipa::path(
    post,
    path = "/api/purchases/{id}/cancel",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    responses(
        (status = 200, description = "Compra cancelada", body = Purchase),
        (status = 409, description = "Compra já cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_purchase(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchasesInactivate>,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.purchase_service.cancel_purchase(purchase_id).await?))
}

// =============================================================================
//  VENDAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = NewSale,
    responses(
        (status = 201, description = "Venda registrada", body = Sale),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermSalesCreate>,
    Json(payload): Json<NewSale>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let sale = app_state.sale_service.register_sale(&payload, &user.actor).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(("status" = Option<SaleStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Vendas", body = Vec<Sale>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<SaleStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.sale_service.list_sales(filter.status).await?))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda", body = Sale),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.sale_service.get_sale(sale_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/sales/{id}/cancel",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda cancelada", body = Sale),
        (status = 409, description = "Venda já cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_sale(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesInactivate>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.sale_service.cancel_sale(sale_id).await?))
}

// =============================================================================
//  ABATE E PRODUÇÃO
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/production/slaughters",
    tag = "Production",
    request_body = NewSlaughter,
    responses((status = 201, description = "Abate registrado", body = Slaughter)),
    security(("api_jwt" = []))
)]
pub async fn register_slaughter(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductionCreate>,
    Json(payload): Json<NewSlaughter>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let slaughter = app_state.production_service.register_slaughter(&payload).await?;
    Ok((StatusCode::CREATED, Json(slaughter)))
}

#[utoipa::path(
    get,
    path = "/api/production/slaughters",
    tag = "Production",
    responses((status = 200, description = "Abates", body = Vec<Slaughter>)),
    security(("api_jwt" = []))
)]
pub async fn list_slaughters(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.production_service.list_slaughters().await?))
}

#[utoipa::path(
    patch,
    path = "/api/production/slaughters/{id}/status",
    tag = "Production",
    request_body = StatusChange,
    params(("id" = Uuid, Path, description = "ID do abate")),
    responses((status = 200, description = "Status alterado", body = Slaughter)),
    security(("api_jwt" = []))
)]
pub async fn set_slaughter_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductionInactivate>,
    Path(slaughter_id): Path<Uuid>,
    Json(payload): Json<StatusChange>,
) -> Result<impl IntoResponse, AppError> {
    let slaughter = app_state
        .production_service
        .set_slaughter_status(slaughter_id, payload.status)
        .await?;
    Ok(Json(slaughter))
}

#[utoipa::path(
    post,
    path = "/api/production/runs",
    tag = "Production",
    request_body = NewProductionRun,
    responses(
        (status = 201, description = "Produção registrada", body = ProductionRun),
        (status = 404, description = "Abate ou produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_production(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductionCreate>,
    Json(payload): Json<NewProductionRun>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let run = app_state
        .production_service
        .register_production(&payload, &user.actor)
        .await?;
    Ok((StatusCode::CREATED, Json(run)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRunsQuery {
    pub slaughter_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/production/runs",
    tag = "Production",
    params(("slaughterId" = Option<Uuid>, Query, description = "Filtra pelo abate de origem")),
    responses((status = 200, description = "Produções", body = Vec<ProductionRun>)),
    security(("api_jwt" = []))
)]
pub async fn list_production_runs(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ProductionRunsQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.production_service.list_production_runs(query.slaughter_id).await?))
}
