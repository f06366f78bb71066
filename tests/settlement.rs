mod common;

use common::{date, installment_purchase, Fixture};
use rust_decimal_macros::dec;
use uuid::Uuid;

use gestao_backend::{
    common::error::AppError,
    models::{
        finance::{BankAccount, BankMovement, Expense, LedgerReason, NewExpense, PayableEntry},
        status::{ExpenseStatus, PayableStatus},
    },
};

async fn pending_payable(fx: &Fixture, total: rust_decimal::Decimal) -> PayableEntry {
    let supplier = fx.supplier().await;
    let reference = fx.account("Referência", dec!(0)).await;
    let product = fx.product("Miúdos", dec!(0), dec!(1)).await;
    fx.state
        .purchase_service
        .register_purchase(
            &installment_purchase(supplier.id, reference.id, &[(product.id, dec!(1), total)], 1, date(2025, 3, 1)),
            &fx.actor,
        )
        .await
        .unwrap();

    let mut payables: Vec<PayableEntry> = fx.all().await;
    assert_eq!(payables.len(), 1);
    payables.remove(0)
}

#[tokio::test]
async fn paying_twice_is_rejected_and_debits_once() {
    let fx = Fixture::new();
    let entry = pending_payable(&fx, dec!(200)).await;
    let account = fx.account("Pagadora", dec!(1000)).await;

    let paid = fx
        .state
        .finance_service
        .settle_payable(entry.id, account.id, &fx.actor)
        .await
        .unwrap();
    assert_eq!(paid.status, PayableStatus::Paid);
    assert_eq!(paid.paid_from_account_id, Some(account.id));
    assert_eq!(paid.settled_by, Some(fx.actor.id));

    let again = fx.state.finance_service.settle_payable(entry.id, account.id, &fx.actor).await;
    assert!(matches!(again, Err(AppError::EntryAlreadySettled(id)) if id == entry.id));

    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(800));

    let movements: Vec<BankMovement> = fx.all().await;
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].reason, LedgerReason::PayableSettlement);
    assert_eq!(movements[0].reference_id, Some(entry.id));
}

#[tokio::test]
async fn payment_beyond_balance_keeps_entry_pending() {
    let fx = Fixture::new();
    let entry = pending_payable(&fx, dec!(200)).await;
    let account = fx.account("Pagadora", dec!(150)).await;

    let result = fx.state.finance_service.settle_payable(entry.id, account.id, &fx.actor).await;
    assert!(matches!(result, Err(AppError::InsufficientFunds { balance, requested, .. })
        if balance == dec!(150) && requested == dec!(200)));

    let entry: PayableEntry = fx.load(entry.id).await;
    assert_eq!(entry.status, PayableStatus::Pending);
    assert_eq!(entry.paid_at, None);
    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(150));
    assert!(fx.all::<BankMovement>().await.is_empty());
}

#[tokio::test]
async fn paying_an_expense_payable_marks_the_expense_paid() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(500)).await;

    let expense = fx
        .state
        .finance_service
        .register_expense(
            &NewExpense {
                description: "Conta de energia".into(),
                category: "Utilidades".into(),
                amount: dec!(180.40),
                due_date: date(2025, 3, 10),
            },
            &fx.actor,
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);

    let payable: PayableEntry = fx.load(expense.payable_id).await;
    assert_eq!(payable.installment, "1/1");
    assert_eq!(payable.due_date, date(2025, 3, 10));
    assert_eq!(payable.status, PayableStatus::Pending);

    fx.state
        .finance_service
        .settle_payable(payable.id, account.id, &fx.actor)
        .await
        .unwrap();

    let expense: Expense = fx.load(expense.id).await;
    assert_eq!(expense.status, ExpenseStatus::Paid);
    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(319.60));
}

#[tokio::test]
async fn settling_unknown_entries_is_not_found() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(500)).await;

    assert!(matches!(
        fx.state.finance_service.settle_payable(Uuid::new_v4(), account.id, &fx.actor).await,
        Err(AppError::EntityNotFound { entity: "Conta a pagar", .. })
    ));
    assert!(matches!(
        fx.state.finance_service.settle_receivable(Uuid::new_v4(), account.id, &fx.actor).await,
        Err(AppError::EntityNotFound { entity: "Conta a receber", .. })
    ));
}

#[tokio::test]
async fn pending_filter_lists_payables_by_due_date() {
    let fx = Fixture::new();
    let supplier = fx.supplier().await;
    let account = fx.account("Caixa", dec!(1000)).await;
    let product = fx.product("Costela", dec!(0), dec!(1)).await;
    fx.state
        .purchase_service
        .register_purchase(
            &installment_purchase(supplier.id, account.id, &[(product.id, dec!(1), dec!(100))], 3, date(2025, 1, 31)),
            &fx.actor,
        )
        .await
        .unwrap();

    let pending = fx
        .state
        .finance_service
        .list_payables(Some(PayableStatus::Pending))
        .await
        .unwrap();
    let dues: Vec<_> = pending.iter().map(|p| p.due_date).collect();
    assert_eq!(dues, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]);
    assert_eq!(pending[2].amount, dec!(33.34));

    fx.state
        .finance_service
        .settle_payable(pending[0].id, account.id, &fx.actor)
        .await
        .unwrap();
    let paid = fx.state.finance_service.list_payables(Some(PayableStatus::Paid)).await.unwrap();
    assert_eq!(paid.len(), 1);
}
