// src/db/operations_repo.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{fetch_all, fetch_one, DocumentStore, Filter},
    models::{
        operations::{ProductionRun, Purchase, Sale, Slaughter},
        status::SaleStatus,
    },
};

#[derive(Clone)]
pub struct OperationsRepository {
    store: Arc<dyn DocumentStore>,
}

impl OperationsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    //  COMPRAS E VENDAS
    // =========================================================================

    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, AppError> {
        fetch_all(self.store.as_ref(), &Filter::new()).await
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> Result<Purchase, AppError> {
        fetch_one(self.store.as_ref(), purchase_id).await
    }

    pub async fn list_sales(&self, status: Option<SaleStatus>) -> Result<Vec<Sale>, AppError> {
        let filter = match status {
            Some(status) => Filter::new().eq("status", status),
            None => Filter::new(),
        };
        fetch_all(self.store.as_ref(), &filter).await
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> Result<Sale, AppError> {
        fetch_one(self.store.as_ref(), sale_id).await
    }

    // =========================================================================
    //  ABATE E PRODUÇÃO
    // =========================================================================

    pub async fn list_slaughters(&self) -> Result<Vec<Slaughter>, AppError> {
        fetch_all(self.store.as_ref(), &Filter::new()).await
    }

    pub async fn list_production_runs(&self, slaughter_id: Option<Uuid>) -> Result<Vec<ProductionRun>, AppError> {
        let filter = match slaughter_id {
            Some(id) => Filter::new().eq("slaughterId", id),
            None => Filter::new(),
        };
        fetch_all(self.store.as_ref(), &filter).await
    }
}
