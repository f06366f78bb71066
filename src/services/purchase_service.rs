// src/services/purchase_service.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{checked_mul, checked_sum},
    },
    db::{transaction::Transaction, OperationsRepository},
    models::{
        auth::Actor,
        crm::Supplier,
        finance::{BankAccount, LedgerDirection, LedgerReason, PayableSource},
        inventory::{Product, StockDirection, StockReason},
        operations::{NewPurchase, PaymentPlan, Purchase, PurchaseItem},
        status::{transition, PurchaseStatus, RecordStatus},
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        ledger_store::{LedgerChange, LedgerStore},
        register::{PayableOrigin, Register, SettledAtRegistration},
        stock_store::{StockChange, StockStore},
    },
};

#[derive(Clone)]
pub struct PurchaseService {
    coordinator: TransactionCoordinator,
    repo: OperationsRepository,
    stock: StockStore,
    ledger: LedgerStore,
    register: Register,
}

impl PurchaseService {
    pub fn new(coordinator: TransactionCoordinator, repo: OperationsRepository) -> Self {
        let ledger = LedgerStore;
        Self {
            coordinator,
            repo,
            stock: StockStore,
            ledger,
            register: Register::new(ledger),
        }
    }

    /// Registra a compra com todos os efeitos (estoque, banco, contas a pagar) de uma vez.
    pub async fn register_purchase(&self, input: &NewPurchase, actor: &Actor) -> Result<Purchase, AppError> {
        let purchase = self
            .coordinator
            .run(&RegisterPurchase { service: self, input, actor })
            .await?;

        tracing::info!(
            purchase_id = %purchase.id,
            total = %purchase.total,
            installments = purchase.installments,
            "🧾 Compra registrada"
        );
        Ok(purchase)
    }

    /// Cancela a compra. Estoque, saldo e contas a pagar NÃO são revertidos.
    pub async fn cancel_purchase(&self, purchase_id: Uuid) -> Result<Purchase, AppError> {
        self.coordinator.run(&CancelPurchase { purchase_id }).await
    }

    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, AppError> {
        self.repo.list_purchases().await
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> Result<Purchase, AppError> {
        self.repo.get_purchase(purchase_id).await
    }
}

struct RegisterPurchase<'a> {
    service: &'a PurchaseService,
    input: &'a NewPurchase,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for RegisterPurchase<'_> {
    type Output = Purchase;

    fn name(&self) -> &'static str {
        "register_purchase"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Purchase, AppError> {
        let input = self.input;

        // 1. Payload
        let supplier_id = input
            .supplier_id
            .ok_or_else(|| AppError::validation("O fornecedor é obrigatório"))?;
        let account_id = input
            .account_id
            .ok_or_else(|| AppError::validation("Informe a conta bancária da compra"))?;
        if input.items.is_empty() {
            return Err(AppError::validation("Informe ao menos um item"));
        }
        if input.items.iter().any(|i| i.quantity <= Decimal::ZERO || i.unit_cost < Decimal::ZERO) {
            return Err(AppError::validation("Quantidade deve ser positiva e custo não pode ser negativo"));
        }
        let plan = PaymentPlan::from_terms(input.payment_terms, input.installments, input.first_due_date)?;
        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

        // 2. Leituras (tudo antes da primeira gravação)
        let account: BankAccount = tx.require(account_id).await?;
        if account.status != RecordStatus::Active {
            return Err(AppError::validation(format!("Conta '{}' está inativa", account.name)));
        }

        let supplier: Supplier = tx.require(supplier_id).await?;
        if supplier.status != RecordStatus::Active {
            return Err(AppError::validation(format!("Fornecedor '{}' está inativo", supplier.name)));
        }

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product: Product = tx.require(line.product_id).await?;
            items.push(PurchaseItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                subtotal: checked_mul(line.quantity, line.unit_cost)?,
            });
        }

        let total = checked_sum(items.iter().map(|i| i.subtotal))?;
        if total <= Decimal::ZERO {
            return Err(AppError::validation("O total da compra deve ser maior que zero"));
        }

        // 3. Gravações
        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            supplier_id,
            account_id,
            date,
            items,
            total,
            payment_terms: input.payment_terms,
            installments: plan.installment_count(),
            status: PurchaseStatus::Active,
            notes: input.notes.clone(),
            created_by: self.actor.id,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&purchase)?;

        let origin = PayableOrigin {
            source: PayableSource::Purchase(purchase.id),
            supplier_id: Some(supplier_id),
            description: format!("Compra - {}", supplier.name),
            issue_date: date,
        };

        let settled = match plan {
            PaymentPlan::Immediate => {
                self.service
                    .ledger
                    .record_movement(
                        tx,
                        LedgerChange {
                            account_id,
                            amount: total,
                            direction: LedgerDirection::Debit,
                            reason: LedgerReason::Purchase,
                            description: origin.description.clone(),
                            reference_id: Some(purchase.id),
                            actor: self.actor,
                        },
                    )
                    .await?;
                Some(SettledAtRegistration { account_id, actor_id: self.actor.id, at: now })
            }
            PaymentPlan::Installments { .. } => None,
        };
        self.service.register.create_payables(tx, &origin, total, &plan, settled)?;

        for item in &purchase.items {
            self.service
                .stock
                .record_movement(
                    tx,
                    StockChange {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        direction: StockDirection::Entry,
                        reason: StockReason::Purchase,
                        notes: None,
                        reference_id: Some(purchase.id),
                        actor: self.actor,
                    },
                )
                .await?;

            // Custo mais recente de compra vira o custo do produto
            let mut product: Product = tx.require(item.product_id).await?;
            product.unit_cost = item.unit_cost;
            tx.update(&product)?;
        }

        Ok(purchase)
    }
}

struct CancelPurchase {
    purchase_id: Uuid,
}

#[async_trait]
impl TransactionalOp for CancelPurchase {
    type Output = Purchase;

    fn name(&self) -> &'static str {
        "cancel_purchase"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Purchase, AppError> {
        let mut purchase: Purchase = tx.require(self.purchase_id).await?;
        purchase.status = transition(purchase.status, PurchaseStatus::Cancelled)?;
        purchase.updated_at = Utc::now();
        tx.update(&purchase)?;

        tracing::info!(purchase_id = %purchase.id, "Compra cancelada (sem estorno)");
        Ok(purchase)
    }
}
