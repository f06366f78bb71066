// src/services/register.rs

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{store::Filter, transaction::Transaction},
    models::{
        auth::Actor,
        finance::{Expense, LedgerDirection, LedgerReason, PayableEntry, PayableSource, ReceivableEntry},
        operations::{PaymentPlan, Sale, MAX_INSTALLMENTS},
        status::{transition, ExpenseStatus, PayableStatus, ReceivableStatus, SaleStatus, Transition},
    },
    services::ledger_store::{LedgerChange, LedgerStore},
};

/// Uma parcela calculada: posição, valor e vencimento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installment {
    pub number: u32,
    pub count: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

impl Installment {
    pub fn label(&self) -> String {
        format!("{}/{}", self.number, self.count)
    }
}

/// Divide `total` conforme o plano.
///
/// À vista: uma parcela com vencimento em `issue_date`.
/// A prazo: N parcelas arredondadas em centavos, vencendo mês a mês a partir do
/// primeiro vencimento; a última absorve a sobra do arredondamento.
pub fn installment_schedule(
    total: Decimal,
    plan: &PaymentPlan,
    issue_date: NaiveDate,
) -> Result<Vec<Installment>, AppError> {
    match *plan {
        PaymentPlan::Immediate => Ok(vec![Installment {
            number: 1,
            count: 1,
            amount: total,
            due_date: issue_date,
        }]),
        PaymentPlan::Installments { count, first_due_date } => {
            if count == 0 || count > MAX_INSTALLMENTS {
                return Err(AppError::validation(format!(
                    "Número de parcelas deve estar entre 1 e {}",
                    MAX_INSTALLMENTS
                )));
            }
            let base = (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

            (0..count)
                .map(|i| {
                    let amount = if i + 1 == count {
                        total - base * Decimal::from(count - 1)
                    } else {
                        base
                    };
                    if amount <= Decimal::ZERO {
                        return Err(AppError::validation(format!(
                            "Total {} não pode ser dividido em {} parcelas",
                            total, count
                        )));
                    }
                    let due_date = first_due_date
                        .checked_add_months(Months::new(i))
                        .ok_or_else(|| AppError::validation("Data de vencimento fora do intervalo suportado"))?;

                    Ok(Installment { number: i + 1, count, amount, due_date })
                })
                .collect()
        }
    }
}

/// Quem quitou e por qual conta, quando o lançamento já nasce liquidado (à vista).
#[derive(Debug, Clone, Copy)]
pub struct SettledAtRegistration {
    pub account_id: Uuid,
    pub actor_id: Uuid,
    pub at: DateTime<Utc>,
}

/// Documento de origem de contas a pagar.
#[derive(Debug, Clone)]
pub struct PayableOrigin {
    pub source: PayableSource,
    pub supplier_id: Option<Uuid>,
    pub description: String,
    pub issue_date: NaiveDate,
}

/// Documento de origem de contas a receber (sempre uma venda).
#[derive(Debug, Clone)]
pub struct ReceivableOrigin {
    pub sale_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub description: String,
    pub issue_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Register {
    ledger: LedgerStore,
}

impl Register {
    pub fn new(ledger: LedgerStore) -> Self {
        Self { ledger }
    }

    // ---
    // Criação de lançamentos (só enfileira inserções, não lê nada)
    // ---

    pub fn create_payables(
        &self,
        tx: &mut Transaction<'_>,
        origin: &PayableOrigin,
        total: Decimal,
        plan: &PaymentPlan,
        settled: Option<SettledAtRegistration>,
    ) -> Result<Vec<PayableEntry>, AppError> {
        let now = Utc::now();
        let schedule = installment_schedule(total, plan, origin.issue_date)?;
        let mut entries = Vec::with_capacity(schedule.len());

        for installment in schedule {
            let entry = PayableEntry {
                id: Uuid::new_v4(),
                source: origin.source,
                supplier_id: origin.supplier_id,
                description: origin.description.clone(),
                amount: installment.amount,
                issue_date: origin.issue_date,
                due_date: installment.due_date,
                installment: installment.label(),
                status: if settled.is_some() { PayableStatus::Paid } else { PayableStatus::Pending },
                paid_at: settled.map(|s| s.at),
                paid_from_account_id: settled.map(|s| s.account_id),
                settled_by: settled.map(|s| s.actor_id),
                created_at: now,
            };
            tx.insert(&entry)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn create_receivables(
        &self,
        tx: &mut Transaction<'_>,
        origin: &ReceivableOrigin,
        total: Decimal,
        plan: &PaymentPlan,
        settled: Option<SettledAtRegistration>,
    ) -> Result<Vec<ReceivableEntry>, AppError> {
        let now = Utc::now();
        let schedule = installment_schedule(total, plan, origin.issue_date)?;
        let mut entries = Vec::with_capacity(schedule.len());

        for installment in schedule {
            let entry = ReceivableEntry {
                id: Uuid::new_v4(),
                sale_id: origin.sale_id,
                customer_id: origin.customer_id,
                description: origin.description.clone(),
                amount: installment.amount,
                issue_date: origin.issue_date,
                due_date: installment.due_date,
                installment: installment.label(),
                status: if settled.is_some() { ReceivableStatus::Received } else { ReceivableStatus::Pending },
                received_at: settled.map(|s| s.at),
                received_in_account_id: settled.map(|s| s.account_id),
                settled_by: settled.map(|s| s.actor_id),
                created_at: now,
            };
            tx.insert(&entry)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    // ---
    // Liquidação
    // ---

    /// Paga uma conta a pagar: débito na conta, entrada vira PAID e, se veio de
    /// uma despesa, a despesa também.
    pub async fn settle_payable(
        &self,
        tx: &mut Transaction<'_>,
        entry_id: Uuid,
        account_id: Uuid,
        actor: &Actor,
    ) -> Result<PayableEntry, AppError> {
        // 1. Leituras
        let mut entry: PayableEntry = tx.require(entry_id).await?;
        if entry.status.is_terminal() {
            return Err(AppError::EntryAlreadySettled(entry.id));
        }

        let expense = match entry.source {
            PayableSource::Expense(expense_id) => Some(tx.require::<Expense>(expense_id).await?),
            PayableSource::Purchase(_) => None,
        };

        // 2. Débito (lê a conta, valida saldo e enfileira)
        self.ledger
            .record_movement(
                tx,
                LedgerChange {
                    account_id,
                    amount: entry.amount,
                    direction: LedgerDirection::Debit,
                    reason: LedgerReason::PayableSettlement,
                    description: format!("Pagamento: {} ({})", entry.description, entry.installment),
                    reference_id: Some(entry.id),
                    actor,
                },
            )
            .await?;

        // 3. Status
        let now = Utc::now();
        entry.status = transition(entry.status, PayableStatus::Paid)?;
        entry.paid_at = Some(now);
        entry.paid_from_account_id = Some(account_id);
        entry.settled_by = Some(actor.id);
        tx.update(&entry)?;

        if let Some(mut expense) = expense {
            expense.status = transition(expense.status, ExpenseStatus::Paid)?;
            expense.updated_at = now;
            tx.update(&expense)?;
        }

        tracing::info!(entry_id = %entry.id, %account_id, amount = %entry.amount, "💸 Conta a pagar liquidada");
        Ok(entry)
    }

    /// Recebe uma conta a receber: crédito na conta, entrada vira RECEIVED e a
    /// venda passa a PAID quando não sobra parcela pendente.
    pub async fn settle_receivable(
        &self,
        tx: &mut Transaction<'_>,
        entry_id: Uuid,
        account_id: Uuid,
        actor: &Actor,
    ) -> Result<ReceivableEntry, AppError> {
        // 1. Leituras
        let mut entry: ReceivableEntry = tx.require(entry_id).await?;
        if entry.status.is_terminal() {
            return Err(AppError::EntryAlreadySettled(entry.id));
        }

        let mut sale: Sale = tx.require(entry.sale_id).await?;
        let siblings: Vec<ReceivableEntry> = tx.query(&Filter::new().eq("saleId", sale.id)).await?;
        let last_pending = siblings
            .iter()
            .filter(|r| r.id != entry.id)
            .all(|r| r.status == ReceivableStatus::Received);

        // 2. Crédito
        self.ledger
            .record_movement(
                tx,
                LedgerChange {
                    account_id,
                    amount: entry.amount,
                    direction: LedgerDirection::Credit,
                    reason: LedgerReason::ReceivableSettlement,
                    description: format!("Recebimento: {} ({})", entry.description, entry.installment),
                    reference_id: Some(entry.id),
                    actor,
                },
            )
            .await?;

        // 3. Status
        let now = Utc::now();
        entry.status = transition(entry.status, ReceivableStatus::Received)?;
        entry.received_at = Some(now);
        entry.received_in_account_id = Some(account_id);
        entry.settled_by = Some(actor.id);
        tx.update(&entry)?;

        // Venda cancelada continua cancelada
        if last_pending && sale.status == SaleStatus::Pending {
            sale.status = transition(sale.status, SaleStatus::Paid)?;
            sale.updated_at = now;
            tx.update(&sale)?;
        }

        tracing::info!(entry_id = %entry.id, %account_id, amount = %entry.amount, "💰 Conta a receber liquidada");
        Ok(entry)
    }
}
