pub mod auth;
pub mod coordinator;
pub mod crm_service;
pub mod finance_service;
pub mod inventory_service;
pub mod ledger_store;
pub mod production_service;
pub mod purchase_service;
pub mod record_status;
pub mod register;
pub mod sale_service;
pub mod stock_store;
