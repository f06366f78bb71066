// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    let inventory_routes = Router::new()
        .route(
            "/products",
            post(handlers::inventory::create_product).get(handlers::inventory::list_products),
        )
        .route("/products/{id}", get(handlers::inventory::get_product))
        .route("/products/{id}/status", patch(handlers::inventory::set_product_status))
        .route("/products/{id}/movements", get(handlers::inventory::list_product_movements))
        .route("/products/{id}/reconciliation", get(handlers::inventory::reconcile_product))
        .route("/adjustments", post(handlers::inventory::adjust_stock));

    let finance_routes = Router::new()
        .route(
            "/accounts",
            post(handlers::finance::create_account).get(handlers::finance::list_accounts),
        )
        .route("/accounts/{id}/status", patch(handlers::finance::set_account_status))
        .route("/accounts/{id}/adjustments", post(handlers::finance::adjust_balance))
        .route("/accounts/{id}/movements", get(handlers::finance::list_account_movements))
        .route("/accounts/{id}/reconciliation", get(handlers::finance::reconcile_account))
        .route(
            "/expenses",
            post(handlers::finance::register_expense).get(handlers::finance::list_expenses),
        )
        .route("/payables", get(handlers::finance::list_payables))
        .route("/payables/{id}/settle", post(handlers::finance::settle_payable))
        .route("/receivables", get(handlers::finance::list_receivables))
        .route("/receivables/{id}/settle", post(handlers::finance::settle_receivable));

    let sales_and_purchases = Router::new()
        .route(
            "/purchases",
            post(handlers::operations::register_purchase).get(handlers::operations::list_purchases),
        )
        .route("/purchases/{id}", get(handlers::operations::get_purchase))
        .route("/purchases/{id}/cancel", post(handlers::operations::cancel_purchase))
        .route(
            "/sales",
            post(handlers::operations::register_sale).get(handlers::operations::list_sales),
        )
        .route("/sales/{id}", get(handlers::operations::get_sale))
        .route("/sales/{id}/cancel", post(handlers::operations::cancel_sale));

    let production_routes = Router::new()
        .route(
            "/slaughters",
            post(handlers::operations::register_slaughter).get(handlers::operations::list_slaughters),
        )
        .route("/slaughters/{id}/status", patch(handlers::operations::set_slaughter_status))
        .route(
            "/runs",
            post(handlers::operations::register_production).get(handlers::operations::list_production_runs),
        );

    let crm_routes = Router::new()
        .route(
            "/suppliers",
            post(handlers::crm::create_supplier).get(handlers::crm::list_suppliers),
        )
        .route("/suppliers/{id}/status", patch(handlers::crm::set_supplier_status))
        .route(
            "/customers",
            post(handlers::crm::create_customer).get(handlers::crm::list_customers),
        )
        .route("/customers/{id}/status", patch(handlers::crm::set_customer_status));

    // Tudo em /api (exceto health) exige token
    let protected = Router::new()
        .nest("/inventory", inventory_routes)
        .nest("/finance", finance_routes)
        .merge(sales_and_purchases)
        .nest("/production", production_routes)
        .nest("/crm", crm_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}
