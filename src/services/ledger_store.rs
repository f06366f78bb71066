// src/services/ledger_store.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::checked_add},
    db::transaction::Transaction,
    models::{
        auth::Actor,
        finance::{BankAccount, BankMovement, LedgerDirection, LedgerReason},
        status::RecordStatus,
    },
};

#[derive(Debug, Clone)]
pub struct LedgerChange<'a> {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub direction: LedgerDirection,
    pub reason: LedgerReason,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub actor: &'a Actor,
}

/// Única porta de alteração do saldo de uma conta.
/// Saldo nunca fica negativo: débito maior que o saldo falha com `InsufficientFunds`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerStore;

impl LedgerStore {
    pub async fn record_movement(
        &self,
        tx: &mut Transaction<'_>,
        change: LedgerChange<'_>,
    ) -> Result<BankMovement, AppError> {
        if change.amount <= Decimal::ZERO {
            return Err(AppError::validation("O valor movimentado deve ser maior que zero"));
        }

        let mut account: BankAccount = tx.require(change.account_id).await?;

        if account.status != RecordStatus::Active {
            return Err(AppError::validation(format!(
                "Conta '{}' está inativa e não aceita movimentações",
                account.name
            )));
        }
        if change.direction == LedgerDirection::Debit && account.current_balance < change.amount {
            return Err(AppError::InsufficientFunds {
                account_id: account.id,
                account_name: account.name.clone(),
                balance: account.current_balance,
                requested: change.amount,
            });
        }

        let now = Utc::now();
        let signed = change.direction.signed(change.amount);
        let balance_before = account.current_balance;
        let balance_after = checked_add(balance_before, signed)?;

        account.current_balance = balance_after;
        account.updated_at = now;

        let movement = BankMovement {
            id: Uuid::new_v4(),
            account_id: account.id,
            amount: signed,
            direction: change.direction,
            reason: change.reason,
            description: change.description,
            reference_id: change.reference_id,
            balance_before,
            balance_after,
            actor_id: change.actor.id,
            actor_name: change.actor.display_name.clone(),
            created_at: now,
        };

        tx.update(&account)?;
        tx.insert(&movement)?;

        tracing::debug!(
            account_id = %account.id,
            amount = %signed,
            reason = ?change.reason,
            "Movimentação bancária enfileirada"
        );

        Ok(movement)
    }

    /// Saldo reconstruído: saldo inicial + soma das movimentações.
    pub fn replay(initial_balance: Decimal, movements: &[BankMovement]) -> Decimal {
        initial_balance + movements.iter().map(|m| m.amount).sum::<Decimal>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_store::MemoryDocumentStore, store::DocumentStore};
    use rust_decimal_macros::dec;

    fn account(balance: Decimal) -> BankAccount {
        let now = Utc::now();
        BankAccount {
            id: Uuid::new_v4(),
            name: "Caixa".into(),
            bank_name: None,
            initial_balance: balance,
            current_balance: balance,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn change(account_id: Uuid, amount: Decimal, direction: LedgerDirection, actor: &Actor) -> LedgerChange<'_> {
        LedgerChange {
            account_id,
            amount,
            direction,
            reason: LedgerReason::Adjustment,
            description: "ajuste".into(),
            reference_id: None,
            actor,
        }
    }

    #[tokio::test]
    async fn debit_records_balance_before_and_after() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Financeiro");
        let acc = account(dec!(1000));
        let mut seed = Transaction::new(&store);
        seed.insert(&acc).unwrap();
        seed.commit().await.unwrap();

        let mut tx = Transaction::new(&store);
        let first = LedgerStore
            .record_movement(&mut tx, change(acc.id, dec!(300), LedgerDirection::Debit, &actor))
            .await
            .unwrap();
        let second = LedgerStore
            .record_movement(&mut tx, change(acc.id, dec!(50), LedgerDirection::Credit, &actor))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!((first.balance_before, first.balance_after), (dec!(1000), dec!(700)));
        assert_eq!((second.balance_before, second.balance_after), (dec!(700), dec!(750)));
        assert_eq!(LedgerStore::replay(dec!(1000), &[first, second]), dec!(750));

        let stored: BankAccount = store.get("bank_accounts", acc.id).await.unwrap().unwrap().decode().unwrap();
        assert_eq!(stored.current_balance, dec!(750));
    }

    #[tokio::test]
    async fn overdraft_is_rejected_without_writes() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Financeiro");
        let acc = account(dec!(150));
        let mut seed = Transaction::new(&store);
        seed.insert(&acc).unwrap();
        seed.commit().await.unwrap();

        let mut tx = Transaction::new(&store);
        let result = LedgerStore
            .record_movement(&mut tx, change(acc.id, dec!(200), LedgerDirection::Debit, &actor))
            .await;

        assert!(matches!(
            result,
            Err(AppError::InsufficientFunds { balance, requested, .. }) if balance == dec!(150) && requested == dec!(200)
        ));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Financeiro");
        let mut tx = Transaction::new(&store);

        let result = LedgerStore
            .record_movement(&mut tx, change(Uuid::new_v4(), dec!(1), LedgerDirection::Credit, &actor))
            .await;

        assert!(matches!(result, Err(AppError::EntityNotFound { entity: "Conta bancária", .. })));
    }
}
