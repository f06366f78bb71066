// src/db/finance_repo.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{fetch_all, fetch_one, DocumentStore, Filter},
    models::{
        finance::{BankAccount, BankMovement, Expense, PayableEntry, ReceivableEntry},
        status::{ExpenseStatus, PayableStatus, ReceivableStatus},
    },
};

fn status_filter<S: serde::Serialize>(status: Option<S>) -> Filter {
    match status {
        Some(status) => Filter::new().eq("status", status),
        None => Filter::new(),
    }
}

#[derive(Clone)]
pub struct FinanceRepository {
    store: Arc<dyn DocumentStore>,
}

impl FinanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // --- CONTAS BANCÁRIAS ---

    pub async fn list_accounts(&self) -> Result<Vec<BankAccount>, AppError> {
        let mut accounts: Vec<BankAccount> = fetch_all(self.store.as_ref(), &Filter::new()).await?;
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<BankAccount, AppError> {
        fetch_one(self.store.as_ref(), account_id).await
    }

    pub async fn list_bank_movements(&self, account_id: Uuid) -> Result<Vec<BankMovement>, AppError> {
        fetch_all(self.store.as_ref(), &Filter::new().eq("accountId", account_id)).await
    }

    // --- CONTAS A PAGAR / RECEBER ---
    // Ordenadas por vencimento, como na tela de contas

    pub async fn list_payables(&self, status: Option<PayableStatus>) -> Result<Vec<PayableEntry>, AppError> {
        let mut entries: Vec<PayableEntry> = fetch_all(self.store.as_ref(), &status_filter(status)).await?;
        entries.sort_by_key(|e| e.due_date);
        Ok(entries)
    }

    pub async fn list_receivables(&self, status: Option<ReceivableStatus>) -> Result<Vec<ReceivableEntry>, AppError> {
        let mut entries: Vec<ReceivableEntry> = fetch_all(self.store.as_ref(), &status_filter(status)).await?;
        entries.sort_by_key(|e| e.due_date);
        Ok(entries)
    }

    // --- DESPESAS ---

    pub async fn list_expenses(&self, status: Option<ExpenseStatus>) -> Result<Vec<Expense>, AppError> {
        fetch_all(self.store.as_ref(), &status_filter(status)).await
    }
}
