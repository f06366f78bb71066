// src/db/inventory_repo.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{fetch_all, fetch_one, DocumentStore, Filter},
    models::{
        inventory::{Product, StockMovement},
        status::RecordStatus,
    },
};

#[derive(Clone)]
pub struct InventoryRepository {
    store: Arc<dyn DocumentStore>,
}

impl InventoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // ---
    // Funções de "Leitura" (fora de escopo transacional)
    // ---

    pub async fn list_products(&self, status: Option<RecordStatus>) -> Result<Vec<Product>, AppError> {
        let filter = match status {
            Some(status) => Filter::new().eq("status", status),
            None => Filter::new(),
        };
        let mut products: Vec<Product> = fetch_all(self.store.as_ref(), &filter).await?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        fetch_one(self.store.as_ref(), product_id).await
    }

    /// Histórico do produto, do mais antigo para o mais novo.
    pub async fn list_movements(&self, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        fetch_all(self.store.as_ref(), &Filter::new().eq("productId", product_id)).await
    }
}
