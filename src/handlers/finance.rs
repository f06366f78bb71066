// src/handlers/finance.rs

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
        rbac::{PermFinanceCreate, PermFinanceEdit, PermFinanceInactivate, RequirePermission},
    },
    models::{
        finance::{
            BalanceAdjustment, BankAccount, BankMovement, Expense, NewBankAccount, NewExpense, PayableEntry,
            ReceivableEntry, Reconciliation, SettleEntry,
        },
        status::{ExpenseStatus, PayableStatus, ReceivableStatus, StatusChange, StatusFilter},
    },
};

fn settlement_account(payload: &SettleEntry) -> Result<Uuid, AppError> {
    payload.validate()?;
    payload
        .account_id
        .ok_or_else(|| AppError::validation("Informe a conta bancária"))
}

// =============================================================================
//  CONTAS BANCÁRIAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/finance/accounts",
    tag = "Finance",
    request_body = NewBankAccount,
    responses(
        (status = 201, description = "Conta criada", body = BankAccount),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermFinanceCreate>,
    Json(payload): Json<NewBankAccount>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let account = app_state.finance_service.create_account(&payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    get,
    path = "/api/finance/accounts",
    tag = "Finance",
    responses((status = 200, description = "Contas bancárias", body = Vec<BankAccount>)),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.list_accounts().await?))
}

#[utoipa::path(
    patch,
    path = "/api/finance/accounts/{id}/status",
    tag = "Finance",
    request_body = StatusChange,
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses((status = 200, description = "Status alterado", body = BankAccount)),
    security(("api_jwt" = []))
)]
pub async fn set_account_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermFinanceInactivate>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<StatusChange>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state
        .finance_service
        .set_account_status(account_id, payload.status)
        .await?;
    Ok(Json(account))
}

// Alteração manual de saldo
#[utoipa::path(
    post,
    path = "/api/finance/accounts/{id}/adjustments",
    tag = "Finance",
    request_body = BalanceAdjustment,
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 201, description = "Movimentação registrada", body = BankMovement),
        (status = 409, description = "Saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_balance(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermFinanceEdit>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<BalanceAdjustment>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let movement = app_state
        .finance_service
        .adjust_balance(account_id, &payload, &user.actor)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

#[utoipa::path(
    get,
    path = "/api/finance/accounts/{id}/movements",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses((status = 200, description = "Extrato da conta", body = Vec<BankMovement>)),
    security(("api_jwt" = []))
)]
pub async fn list_account_movements(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.list_account_movements(account_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/finance/accounts/{id}/reconciliation",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses((status = 200, description = "Saldo em cache x histórico", body = Reconciliation)),
    security(("api_jwt" = []))
)]
pub async fn reconcile_account(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.reconcile_account(account_id).await?))
}

// =============================================================================
//  DESPESAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/finance/expenses",
    tag = "Finance",
    request_body = NewExpense,
    responses((status = 201, description = "Despesa e conta a pagar criadas", body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn register_expense(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermFinanceCreate>,
    Json(payload): Json<NewExpense>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let expense = app_state
        .finance_service
        .register_expense(&payload, &user.actor)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/finance/expenses",
    tag = "Finance",
    params(("status" = Option<ExpenseStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Despesas", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<ExpenseStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.list_expenses(filter.status).await?))
}

// =============================================================================
//  CONTAS A PAGAR / RECEBER
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/finance/payables",
    tag = "Finance",
    params(("status" = Option<PayableStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a pagar por vencimento", body = Vec<PayableEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_payables(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<PayableStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.list_payables(filter.status).await?))
}

#[utoipa::path(
    post,
    path = "/api/finance/payables/{id}/settle",
    tag = "Finance",
    request_body = SettleEntry,
    params(("id" = Uuid, Path, description = "ID da conta a pagar")),
    responses(
        (status = 200, description = "Conta paga", body = PayableEntry),
        (status = 409, description = "Já liquidada ou saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_payable(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermFinanceEdit>,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<SettleEntry>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = settlement_account(&payload)?;
    let entry = app_state
        .finance_service
        .settle_payable(entry_id, account_id, &user.actor)
        .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/api/finance/receivables",
    tag = "Finance",
    params(("status" = Option<ReceivableStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a receber por vencimento", body = Vec<ReceivableEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_receivables(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StatusFilter<ReceivableStatus>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.finance_service.list_receivables(filter.status).await?))
}

#[utoipa::path(
    post,
    path = "/api/finance/receivables/{id}/settle",
    tag = "Finance",
    request_body = SettleEntry,
    params(("id" = Uuid, Path, description = "ID da conta a receber")),
    responses(
        (status = 200, description = "Conta recebida", body = ReceivableEntry),
        (status = 409, description = "Já liquidada")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_receivable(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermFinanceEdit>,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<SettleEntry>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = settlement_account(&payload)?;
    let entry = app_state
        .finance_service
        .settle_receivable(entry_id, account_id, &user.actor)
        .await?;
    Ok(Json(entry))
}
