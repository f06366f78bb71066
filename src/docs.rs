// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- INVENTORY ---
        handlers::inventory::create_product,
        handlers::inventory::list_products,
        handlers::inventory::get_product,
        handlers::inventory::set_product_status,
        handlers::inventory::list_product_movements,
        handlers::inventory::reconcile_product,
        handlers::inventory::adjust_stock,

        // --- FINANCE ---
        handlers::finance::create_account,
        handlers::finance::list_accounts,
        handlers::finance::set_account_status,
        handlers::finance::adjust_balance,
        handlers::finance::list_account_movements,
        handlers::finance::reconcile_account,
        handlers::finance::register_expense,
        handlers::finance::list_expenses,
        handlers::finance::list_payables,
        handlers::finance::settle_payable,
        handlers::finance::list_receivables,
        handlers::finance::settle_receivable,

        // --- PURCHASES / SALES ---
        handlers::operations::register_purchase,
        handlers::operations::list_purchases,
        handlers::operations::get_purchase,
        handlers::operations::cancel_purchase,
        handlers::operations::register_sale,
        handlers::operations::list_sales,
        handlers::operations::get_sale,
        handlers::operations::cancel_sale,

        // --- PRODUCTION ---
        handlers::operations::register_slaughter,
        handlers::operations::list_slaughters,
        handlers::operations::set_slaughter_status,
        handlers::operations::register_production,
        handlers::operations::list_production_runs,

        // --- CRM ---
        handlers::crm::create_supplier,
        handlers::crm::list_suppliers,
        handlers::crm::set_supplier_status,
        handlers::crm::create_customer,
        handlers::crm::list_customers,
        handlers::crm::set_customer_status,
    ),
    components(
        schemas(
            // --- Status ---
            models::status::RecordStatus,
            models::status::PurchaseStatus,
            models::status::SaleStatus,
            models::status::ExpenseStatus,
            models::status::PayableStatus,
            models::status::ReceivableStatus,
            models::status::StatusChange,

            // --- Inventory ---
            models::inventory::ProductKind,
            models::inventory::StockDirection,
            models::inventory::StockReason,
            models::inventory::Product,
            models::inventory::StockMovement,
            models::inventory::NewProduct,
            models::inventory::StockAdjustment,

            // --- Finance ---
            models::finance::LedgerDirection,
            models::finance::LedgerReason,
            models::finance::BankAccount,
            models::finance::BankMovement,
            models::finance::PayableSource,
            models::finance::PayableEntry,
            models::finance::ReceivableEntry,
            models::finance::Expense,
            models::finance::Reconciliation,
            models::finance::NewBankAccount,
            models::finance::BalanceAdjustment,
            models::finance::NewExpense,
            models::finance::SettleEntry,

            // --- Operations ---
            models::operations::PaymentTerms,
            models::operations::PurchaseItem,
            models::operations::Purchase,
            models::operations::NewPurchaseItem,
            models::operations::NewPurchase,
            models::operations::SaleItem,
            models::operations::Sale,
            models::operations::NewSaleItem,
            models::operations::NewSale,
            models::operations::Slaughter,
            models::operations::NewSlaughter,
            models::operations::ProducedItem,
            models::operations::ProductionRun,
            models::operations::NewProducedItem,
            models::operations::NewProductionRun,

            // --- CRM ---
            models::crm::Supplier,
            models::crm::Customer,
            models::crm::NewPartner,
        )
    ),
    tags(
        (name = "Inventory", description = "Produtos e movimentações de estoque"),
        (name = "Finance", description = "Contas bancárias, despesas, contas a pagar e a receber"),
        (name = "Purchases", description = "Compras com entrada de estoque e contas a pagar"),
        (name = "Sales", description = "Vendas com saída de estoque e contas a receber"),
        (name = "Production", description = "Abates e produção"),
        (name = "CRM", description = "Fornecedores e clientes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
