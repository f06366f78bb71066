// src/handlers/crm.rs

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
        rbac::{PermCrmCreate, PermCrmInactivate, RequirePermission},
    },
    models::{
        crm::{Customer, NewPartner, Supplier},
        status::{RecordStatus, StatusChange, StatusFilter},
    },
};

// --- FORNECEDORES ---

#[utoipa::path(
    post,
    path = "/api/crm/suppliers",
    tag = "CRM",
    request_body = NewPartner,
    responses(
        (status = 201, description = "Fornecedor cadastrado", body = Supplier),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCrmCreate>,
    Json(payload): Json<NewPartner>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let supplier = app_state.crm_service.create_supplier(&payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    get,
    path = "/api/crm/suppliers",
    tag = "CRM",
    params(("status" = Option<RecordStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Fornecedores", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<RecordStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.crm_service.list_suppliers(filter.status).await?))
}

#[utoipa::path(
    patch,
    path = "/api/crm/suppliers/{id}/status",
    tag = "CRM",
    request_body = StatusChange,
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses((status = 200, description = "Status alterado", body = Supplier)),
    security(("api_jwt" = []))
)]
pub async fn set_supplier_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCrmInactivate>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<StatusChange>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.crm_service.set_supplier_status(supplier_id, payload.status).await?))
}

// --- CLIENTES ---

#[utoipa::path(
    post,
    path = "/api/crm/customers",
    tag = "CRM",
    request_body = NewPartner,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Customer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCrmCreate>,
    Json(payload): Json<NewPartner>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let customer = app_state.crm_service.create_customer(&payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/api/crm/customers",
    tag = "CRM",
    params(("status" = Option<RecordStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Clientes", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<RecordStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.crm_service.list_customers(filter.status).await?))
}

#[utoipa::path(
    patch,
    path = "/api/crm/customers/{id}/status",
    tag = "CRM",
    request_body = StatusChange,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 200, description = "Status alterado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn set_customer_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCrmInactivate>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<StatusChange>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.crm_service.set_customer_status(customer_id, payload.status).await?))
}
