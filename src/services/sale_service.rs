// src/services/sale_service.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{checked_add, checked_mul, checked_sum},
    },
    db::{transaction::Transaction, OperationsRepository},
    models::{
        auth::Actor,
        crm::Customer,
        finance::{BankAccount, LedgerDirection, LedgerReason},
        inventory::{Product, StockDirection, StockReason},
        operations::{NewSale, PaymentPlan, Sale, SaleItem},
        status::{transition, RecordStatus, SaleStatus},
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        ledger_store::{LedgerChange, LedgerStore},
        register::{ReceivableOrigin, Register, SettledAtRegistration},
        stock_store::{StockChange, StockStore},
    },
};

#[derive(Clone)]
pub struct SaleService {
    coordinator: TransactionCoordinator,
    repo: OperationsRepository,
    stock: StockStore,
    ledger: LedgerStore,
    register: Register,
}

impl SaleService {
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

    pub async fn register_sale(&self, input: &NewSale, actor: &Actor) -> Result<Sale, AppError> {
        let sale = self
            .coordinator
            .run(&RegisterSale { service: self, input, actor })
            .await?;

        tracing::info!(
            sale_id = %sale.id,
            total = %sale.total,
            margin = %sale.margin(),
            status = ?sale.status,
            "🛒 Venda registrada"
        );
        Ok(sale)
    }

    /// Cancela a venda. Estoque, saldo e contas a receber NÃO são revertidos.
    pub async fn cancel_sale(&self, sale_id: Uuid) -> Result<Sale, AppError> {
        self.coordinator.run(&CancelSale { sale_id }).await
    }

    pub async fn list_sales(&self, status: Option<SaleStatus>) -> Result<Vec<Sale>, AppError> {
        self.repo.list_sales(status).await
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> Result<Sale, AppError> {
        self.repo.get_sale(sale_id).await
    }
}

struct RegisterSale<'a> {
    service: &'a SaleService,
    input: &'a NewSale,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for RegisterSale<'_> {
    type Output = Sale;

    fn name(&self) -> &'static str {
        "register_sale"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Sale, AppError> {
        let input = self.input;

        // 1. Payload
        let account_id = input
            .account_id
            .ok_or_else(|| AppError::validation("Informe a conta bancária da venda"))?;
        if input.items.is_empty() {
            return Err(AppError::validation("Informe ao menos um item"));
        }
        if input.items.iter().any(|i| i.quantity <= Decimal::ZERO || i.unit_price < Decimal::ZERO) {
            return Err(AppError::validation("Quantidade deve ser positiva e preço não pode ser negativo"));
        }
        let plan = PaymentPlan::from_terms(input.payment_terms, input.installments, input.first_due_date)?;
        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

        // 2. Leituras
        let account: BankAccount = tx.require(account_id).await?;
        if account.status != RecordStatus::Active {
            return Err(AppError::validation(format!("Conta '{}' está inativa", account.name)));
        }

        let customer_name = match input.customer_id {
            Some(customer_id) => {
                let customer: Customer = tx.require(customer_id).await?;
                if customer.status != RecordStatus::Active {
                    return Err(AppError::validation(format!("Cliente '{}' está inativo", customer.name)));
                }
                Some(customer.name)
            }
            None => None,
        };

        // Mesmo produto em várias linhas: a soma é que precisa caber no estoque
        let mut requested: HashMap<Uuid, Decimal> = HashMap::new();
        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product: Product = tx.require(line.product_id).await?;
            if product.status != RecordStatus::Active {
                return Err(AppError::validation(format!("Produto '{}' está inativo", product.name)));
            }

            let total_requested = requested.entry(product.id).or_default();
            *total_requested = checked_add(*total_requested, line.quantity)?;
            StockStore::ensure_available(&product, *total_requested)?;

            items.push(SaleItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                unit_cost: product.unit_cost,
                subtotal: checked_mul(line.quantity, line.unit_price)?,
            });
        }

        let total = checked_sum(items.iter().map(|i| i.subtotal))?;
        let line_costs = items
            .iter()
            .map(|i| checked_mul(i.quantity, i.unit_cost))
            .collect::<Result<Vec<_>, _>>()?;
        let total_cost = checked_sum(line_costs)?;
        if total <= Decimal::ZERO {
            return Err(AppError::validation("O total da venda deve ser maior que zero"));
        }

        // 3. Gravações
        let now = Utc::now();
        let status = match plan {
            PaymentPlan::Immediate => SaleStatus::Paid,
            PaymentPlan::Installments { .. } => SaleStatus::Pending,
        };
        let sale = Sale {
            id: Uuid::new_v4(),
            customer_id: input.customer_id,
            account_id,
            date,
            items,
            total,
            total_cost,
            payment_terms: input.payment_terms,
            installments: plan.installment_count(),
            status,
            notes: input.notes.clone(),
            created_by: self.actor.id,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&sale)?;

        for item in &sale.items {
            self.service
                .stock
                .record_movement(
                    tx,
                    StockChange {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        direction: StockDirection::Exit,
                        reason: StockReason::Sale,
                        notes: None,
                        reference_id: Some(sale.id),
                        actor: self.actor,
                    },
                )
                .await?;
        }

        let origin = ReceivableOrigin {
            sale_id: sale.id,
            customer_id: input.customer_id,
            description: match customer_name {
                Some(name) => format!("Venda - {}", name),
                None => "Venda avulsa".to_string(),
            },
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
                            direction: LedgerDirection::Credit,
                            reason: LedgerReason::Sale,
                            description: origin.description.clone(),
                            reference_id: Some(sale.id),
                            actor: self.actor,
                        },
                    )
                    .await?;
                Some(SettledAtRegistration { account_id, actor_id: self.actor.id, at: now })
            }
            PaymentPlan::Installments { .. } => None,
        };
        self.service.register.create_receivables(tx, &origin, total, &plan, settled)?;

        Ok(sale)
    }
}

struct CancelSale {
    sale_id: Uuid,
}

#[async_trait]
impl TransactionalOp for CancelSale {
    type Output = Sale;

    fn name(&self) -> &'static str {
        "cancel_sale"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Sale, AppError> {
        let mut sale: Sale = tx.require(self.sale_id).await?;
        sale.status = transition(sale.status, SaleStatus::Cancelled)?;
        sale.updated_at = Utc::now();
        tx.update(&sale)?;

        tracing::info!(sale_id = %sale.id, "Venda cancelada (sem estorno)");
        Ok(sale)
    }
}
