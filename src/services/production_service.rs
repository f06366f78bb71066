// src/services/production_service.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::checked_sum},
    db::{transaction::Transaction, OperationsRepository},
    models::{
        auth::Actor,
        crm::Supplier,
        inventory::{Product, StockDirection, StockReason},
        operations::{NewProductionRun, NewSlaughter, ProducedItem, ProductionRun, Slaughter},
        status::RecordStatus,
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        record_status::SetRecordStatus,
        stock_store::{StockChange, StockStore},
    },
};

#[derive(Clone)]
pub struct ProductionService {
    coordinator: TransactionCoordinator,
    repo: OperationsRepository,
    stock: StockStore,
}

impl ProductionService {
    pub fn new(coordinator: TransactionCoordinator, repo: OperationsRepository) -> Self {
        Self { coordinator, repo, stock: StockStore }
    }

    // --- ABATES ---

    pub async fn register_slaughter(&self, input: &NewSlaughter) -> Result<Slaughter, AppError> {
        let slaughter = self.coordinator.run(&RegisterSlaughter { input }).await?;
        tracing::info!(slaughter_id = %slaughter.id, head_count = slaughter.head_count, "🐂 Abate registrado");
        Ok(slaughter)
    }

    pub async fn set_slaughter_status(&self, slaughter_id: Uuid, status: RecordStatus) -> Result<Slaughter, AppError> {
        self.coordinator
            .run(&SetRecordStatus::<Slaughter>::new(slaughter_id, status))
            .await
    }

    pub async fn list_slaughters(&self) -> Result<Vec<Slaughter>, AppError> {
        self.repo.list_slaughters().await
    }

    // --- PRODUÇÃO ---

    pub async fn register_production(&self, input: &NewProductionRun, actor: &Actor) -> Result<ProductionRun, AppError> {
        let run = self
            .coordinator
            .run(&RegisterProduction { service: self, input, actor })
            .await?;

        tracing::info!(
            run_id = %run.id,
            produced = %run.total_produced,
            loss = %run.total_loss,
            "🏭 Produção registrada"
        );
        Ok(run)
    }

    pub async fn list_production_runs(&self, slaughter_id: Option<Uuid>) -> Result<Vec<ProductionRun>, AppError> {
        self.repo.list_production_runs(slaughter_id).await
    }
}

struct RegisterSlaughter<'a> {
    input: &'a NewSlaughter,
}

#[async_trait]
impl TransactionalOp for RegisterSlaughter<'_> {
    type Output = Slaughter;

    fn name(&self) -> &'static str {
        "register_slaughter"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Slaughter, AppError> {
        let input = self.input;
        if input.head_count == 0 || input.live_weight <= Decimal::ZERO {
            return Err(AppError::validation("Informe cabeças e peso vivo do abate"));
        }
        if let Some(supplier_id) = input.supplier_id {
            tx.require::<Supplier>(supplier_id).await?;
        }

        let now = Utc::now();
        let slaughter = Slaughter {
            id: Uuid::new_v4(),
            date: input.date.unwrap_or_else(|| now.date_naive()),
            supplier_id: input.supplier_id,
            head_count: input.head_count,
            live_weight: input.live_weight,
            carcass_weight: input.carcass_weight,
            notes: input.notes.clone(),
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&slaughter)?;
        Ok(slaughter)
    }
}

struct RegisterProduction<'a> {
    service: &'a ProductionService,
    input: &'a NewProductionRun,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for RegisterProduction<'_> {
    type Output = ProductionRun;

    fn name(&self) -> &'static str {
        "register_production"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<ProductionRun, AppError> {
        let input = self.input;

        // 1. Payload
        let slaughter_id = input
            .slaughter_id
            .ok_or_else(|| AppError::validation("O abate de origem é obrigatório"))?;
        if input.items.is_empty() {
            return Err(AppError::validation("Informe ao menos um item produzido"));
        }
        if input
            .items
            .iter()
            .any(|i| i.quantity <= Decimal::ZERO || i.loss_quantity < Decimal::ZERO)
        {
            return Err(AppError::validation("Quantidade produzida deve ser positiva e perda não pode ser negativa"));
        }

        // 2. Leituras
        let slaughter: Slaughter = tx.require(slaughter_id).await?;
        if slaughter.status != RecordStatus::Active {
            return Err(AppError::validation("O abate de origem está inativo"));
        }

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product: Product = tx.require(line.product_id).await?;
            items.push(ProducedItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                loss_quantity: line.loss_quantity,
            });
        }

        // 3. Gravações
        let total_produced = checked_sum(items.iter().map(|i| i.quantity))?;
        let total_loss = checked_sum(items.iter().map(|i| i.loss_quantity))?;

        let now = Utc::now();
        let run = ProductionRun {
            id: Uuid::new_v4(),
            slaughter_id,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            total_produced,
            total_loss,
            items,
            notes: input.notes.clone(),
            created_by: self.actor.id,
            created_at: now,
        };
        tx.insert(&run)?;

        // Perda fica só no registro da produção: nunca entrou no estoque
        for item in &run.items {
            self.service
                .stock
                .record_movement(
                    tx,
                    StockChange {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        direction: StockDirection::Entry,
                        reason: StockReason::Production,
                        notes: None,
                        reference_id: Some(run.id),
                        actor: self.actor,
                    },
                )
                .await?;
        }

        Ok(run)
    }
}
