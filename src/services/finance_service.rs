// src/services/finance_service.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{transaction::Transaction, FinanceRepository},
    models::{
        auth::Actor,
        finance::{
            BalanceAdjustment, BankAccount, BankMovement, Expense, LedgerReason, NewBankAccount, NewExpense,
            PayableEntry, PayableSource, ReceivableEntry, Reconciliation,
        },
        operations::PaymentPlan,
        status::{ExpenseStatus, PayableStatus, ReceivableStatus, RecordStatus},
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        ledger_store::{LedgerChange, LedgerStore},
        record_status::SetRecordStatus,
        register::{PayableOrigin, Register},
    },
};

#[derive(Clone)]
pub struct FinanceService {
    coordinator: TransactionCoordinator,
    repo: FinanceRepository,
    ledger: LedgerStore,
    register: Register,
}

impl FinanceService {
    pub fn new(coordinator: TransactionCoordinator, repo: FinanceRepository) -> Self {
        let ledger = LedgerStore;
        Self { coordinator, repo, ledger, register: Register::new(ledger) }
    }

    // ---
    // CONTAS BANCÁRIAS
    // ---

    pub async fn create_account(&self, input: &NewBankAccount) -> Result<BankAccount, AppError> {
        let account = self.coordinator.run(&CreateAccount { input }).await?;
        tracing::info!(account_id = %account.id, balance = %account.current_balance, "🏦 Conta bancária criada");
        Ok(account)
    }

    /// Alteração manual de saldo (crédito ou débito) com movimentação ADJUSTMENT.
    pub async fn adjust_balance(
        &self,
        account_id: Uuid,
        input: &BalanceAdjustment,
        actor: &Actor,
    ) -> Result<BankMovement, AppError> {
        self.coordinator
            .run(&AdjustBalance { service: self, account_id, input, actor })
            .await
    }

    pub async fn set_account_status(&self, account_id: Uuid, status: RecordStatus) -> Result<BankAccount, AppError> {
        self.coordinator
            .run(&SetRecordStatus::<BankAccount>::new(account_id, status))
            .await
    }

    pub async fn list_accounts(&self) -> Result<Vec<BankAccount>, AppError> {
        self.repo.list_accounts().await
    }

    pub async fn list_account_movements(&self, account_id: Uuid) -> Result<Vec<BankMovement>, AppError> {
        self.repo.get_account(account_id).await?;
        self.repo.list_bank_movements(account_id).await
    }

    /// Compara o saldo em cache com saldo inicial + movimentações, e confere a
    /// cadeia antes/depois de cada movimentação.
    pub async fn reconcile_account(&self, account_id: Uuid) -> Result<Reconciliation, AppError> {
        let account = self.repo.get_account(account_id).await?;
        let movements = self.repo.list_bank_movements(account_id).await?;
        let replayed = LedgerStore::replay(account.initial_balance, &movements);

        let chained = movements
            .iter()
            .try_fold(account.initial_balance, |balance, m| {
                (m.balance_before == balance && m.balance_after == balance + m.amount).then_some(m.balance_after)
            })
            .is_some();
        let consistent = chained && replayed == account.current_balance;
        if !consistent {
            tracing::warn!(%account_id, cached = %account.current_balance, %replayed, "⚠️ Saldo divergente do histórico");
        }

        Ok(Reconciliation {
            entity_id: account_id,
            cached: account.current_balance,
            replayed,
            movements: movements.len(),
            consistent,
        })
    }

    // ---
    // DESPESAS
    // ---

    /// Cria a despesa e sua única conta a pagar (1/1), pendente.
    pub async fn register_expense(&self, input: &NewExpense, actor: &Actor) -> Result<Expense, AppError> {
        let expense = self
            .coordinator
            .run(&RegisterExpense { service: self, input, actor })
            .await?;
        tracing::info!(expense_id = %expense.id, amount = %expense.amount, "Despesa registrada");
        Ok(expense)
    }

    pub async fn list_expenses(&self, status: Option<ExpenseStatus>) -> Result<Vec<Expense>, AppError> {
        self.repo.list_expenses(status).await
    }

    // ---
    // CONTAS A PAGAR / RECEBER
    // ---

    pub async fn list_payables(&self, status: Option<PayableStatus>) -> Result<Vec<PayableEntry>, AppError> {
        self.repo.list_payables(status).await
    }

    pub async fn list_receivables(&self, status: Option<ReceivableStatus>) -> Result<Vec<ReceivableEntry>, AppError> {
        self.repo.list_receivables(status).await
    }

    pub async fn settle_payable(&self, entry_id: Uuid, account_id: Uuid, actor: &Actor) -> Result<PayableEntry, AppError> {
        self.coordinator
            .run(&SettlePayable { register: &self.register, entry_id, account_id, actor })
            .await
    }

    pub async fn settle_receivable(
        &self,
        entry_id: Uuid,
        account_id: Uuid,
        actor: &Actor,
    ) -> Result<ReceivableEntry, AppError> {
        self.coordinator
            .run(&SettleReceivable { register: &self.register, entry_id, account_id, actor })
            .await
    }
}

struct CreateAccount<'a> {
    input: &'a NewBankAccount,
}

#[async_trait]
impl TransactionalOp for CreateAccount<'_> {
    type Output = BankAccount;

    fn name(&self) -> &'static str {
        "create_account"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<BankAccount, AppError> {
        if self.input.initial_balance < Decimal::ZERO {
            return Err(AppError::validation("O saldo inicial não pode ser negativo"));
        }

        let now = Utc::now();
        let account = BankAccount {
            id: Uuid::new_v4(),
            name: self.input.name.trim().to_string(),
            bank_name: self.input.bank_name.clone(),
            initial_balance: self.input.initial_balance,
            current_balance: self.input.initial_balance,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&account)?;
        Ok(account)
    }
}

struct AdjustBalance<'a> {
    service: &'a FinanceService,
    account_id: Uuid,
    input: &'a BalanceAdjustment,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for AdjustBalance<'_> {
    type Output = BankMovement;

    fn name(&self) -> &'static str {
        "adjust_balance"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<BankMovement, AppError> {
        self.service
            .ledger
            .record_movement(
                tx,
                LedgerChange {
                    account_id: self.account_id,
                    amount: self.input.amount,
                    direction: self.input.direction,
                    reason: LedgerReason::Adjustment,
                    description: self.input.description.clone(),
                    reference_id: None,
                    actor: self.actor,
                },
            )
            .await
    }
}

struct RegisterExpense<'a> {
    service: &'a FinanceService,
    input: &'a NewExpense,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for RegisterExpense<'_> {
    type Output = Expense;

    fn name(&self) -> &'static str {
        "register_expense"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Expense, AppError> {
        let input = self.input;
        if input.amount <= Decimal::ZERO {
            return Err(AppError::validation("O valor da despesa deve ser maior que zero"));
        }

        let now = Utc::now();
        let expense_id = Uuid::new_v4();
        let origin = PayableOrigin {
            source: PayableSource::Expense(expense_id),
            supplier_id: None,
            description: format!("Despesa - {}", input.description),
            issue_date: now.date_naive(),
        };
        let plan = PaymentPlan::Installments { count: 1, first_due_date: input.due_date };

        let payables = self.service.register.create_payables(tx, &origin, input.amount, &plan, None)?;
        let payable_id = payables
            .first()
            .map(|p| p.id)
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("despesa sem conta a pagar")))?;

        let expense = Expense {
            id: expense_id,
            description: input.description.clone(),
            category: input.category.clone(),
            amount: input.amount,
            due_date: input.due_date,
            status: ExpenseStatus::Pending,
            payable_id,
            created_by: self.actor.id,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&expense)?;
        Ok(expense)
    }
}

struct SettlePayable<'a> {
    register: &'a Register,
    entry_id: Uuid,
    account_id: Uuid,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for SettlePayable<'_> {
    type Output = PayableEntry;

    fn name(&self) -> &'static str {
        "settle_payable"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<PayableEntry, AppError> {
        self.register
            .settle_payable(tx, self.entry_id, self.account_id, self.actor)
            .await
    }
}

struct SettleReceivable<'a> {
    register: &'a Register,
    entry_id: Uuid,
    account_id: Uuid,
    actor: &'a Actor,
}

#[async_trait]
impl TransactionalOp for SettleReceivable<'_> {
    type Output = ReceivableEntry;

    fn name(&self) -> &'static str {
        "settle_receivable"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<ReceivableEntry, AppError> {
        self.register
            .settle_receivable(tx, self.entry_id, self.account_id, self.actor)
            .await
    }
}
