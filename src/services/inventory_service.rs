// src/services/inventory_service.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{transaction::Transaction, InventoryRepository},
    models::{
        auth::Actor,
        finance::Reconciliation,
        inventory::{NewProduct, Product, StockAdjustment, StockDirection, StockMovement, StockReason},
        status::RecordStatus,
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        record_status::SetRecordStatus,
        stock_store::{StockChange, StockStore},
    },
};

#[derive(Clone)]
pub struct InventoryService {
    coordinator: TransactionCoordinator,
    inventory_repo: InventoryRepository,
    stock: StockStore,
}

impl InventoryService {
    pub fn new(coordinator: TransactionCoordinator, inventory_repo: InventoryRepository) -> Self {
        Self { coordinator, inventory_repo, stock: StockStore }
    }

    // --- CREATE PRODUCT ---
    // Estoque inicial > 0 gera uma movimentação INITIAL_STOCK no mesmo escopo
    pub async fn create_product(&self, input: &NewProduct, actor: &Actor) -> Result<Product, AppError> {
        let product = self
            .coordinator
            .run(&CreateProduct { service: self, input, actor })
            .await?;

        tracing::info!(product_id = %product.id, name = %product.name, quantity = %product.quantity, "📦 Produto criado");
        Ok(product)
    }

    // --- AJUSTE MANUAL ---
    pub async fn adjust_stock(&self, input: &StockAdjustment, actor: &Actor) -> Result<StockMovement, AppError> {
        self.coordinator
            .run(&AdjustStock { service: self, input, actor })
            .await
    }

    pub async fn set_product_status(&self, product_id: Uuid, status: RecordStatus) -> Result<Product, AppError> {
        self.coordinator
            .run(&SetRecordStatus::<Product>::new(product_id, status))
            .await
    }

    // --- LEITURAS ---

    pub async fn list_products(&self, status: Option<RecordStatus>) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_products(status).await
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.inventory_repo.get_product(product_id).await
    }

    pub async fn list_movements(&self, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        // Garante 404 para produto inexistente em vez de lista vazia
        self.inventory_repo.get_product(product_id).await?;
        self.inventory_repo.list_movements(product_id).await
    }

    /// Compara a quantidade em cache com a soma das movimentações.
    pub async fn reconcile_product(&self, product_id: Uuid) -> Result<Reconciliation, AppError> {
        let product = self.inventory_repo.get_product(product_id).await?;
        let movements = self.inventory_repo.list_movements(product_id).await?;
        let replayed = StockStore::replay(&movements);

        let consistent = replayed == product.quantity;
        if !consistent {
            tracing::warn!(%product_id, cached = %product.quantity, %replayed, "⚠️ Estoque divergente do histórico");
        }

        Ok(Reconciliation {
            entity_id: product_id,
            cached: product.quantity,
            replayed,
            movements: movements.len(),
            consistent,
        })
    }
}

struct CreateProduct<'a> {
    service: &'a InventoryService,
    input: &'a NewProduct,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for CreateProduct<'_> {
    type Output = Product;

    fn name(&self) -> &'static str {
        "create_product"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Product, AppError> {
        let input = self.input;
        if input.initial_stock < Decimal::ZERO || input.unit_cost < Decimal::ZERO {
            return Err(AppError::validation("Estoque inicial e custo não podem ser negativos"));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            sku: input.sku.clone(),
            kind: input.kind,
            unit: input.unit.clone(),
            quantity: Decimal::ZERO,
            unit_cost: input.unit_cost,
            sale_price: input.sale_price,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&product)?;

        if input.initial_stock > Decimal::ZERO {
            self.service
                .stock
                .record_movement(
                    tx,
                    StockChange {
                        product_id: product.id,
                        quantity: input.initial_stock,
                        direction: StockDirection::Entry,
                        reason: StockReason::InitialStock,
                        notes: Some("Estoque inicial".to_string()),
                        reference_id: None,
                        actor: self.actor,
                    },
                )
                .await?;
        }

        // Relê para devolver a quantidade já com o estoque inicial
        tx.require(product.id).await
    }
}

struct AdjustStock<'a> {
    service: &'a InventoryService,
    input: &'a StockAdjustment,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for AdjustStock<'_> {
    type Output = StockMovement;

    fn name(&self) -> &'static str {
        "adjust_stock"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<StockMovement, AppError> {
        self.service
            .stock
            .record_movement(
                tx,
                StockChange {
                    product_id: self.input.product_id,
                    quantity: self.input.quantity,
                    direction: self.input.direction,
                    reason: StockReason::Adjustment,
                    notes: Some(self.input.notes.clone()),
                    reference_id: None,
                    actor: self.actor,
                },
            )
            .await
    }
}
