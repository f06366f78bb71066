mod common;

use common::{date, installment_purchase, Fixture};
use rust_decimal_macros::dec;

use gestao_backend::{
    common::error::AppError,
    models::{
        finance::{BalanceAdjustment, BankAccount, BankMovement, LedgerDirection, PayableEntry},
        inventory::{Product, StockAdjustment, StockDirection},
        status::PayableStatus,
    },
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_debits_never_overdraw() {
    let fx = Fixture::with_attempts(64);
    let account = fx.account("Caixa", dec!(100)).await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let state = fx.state.clone();
            let actor = fx.actor.clone();
            tokio::spawn(async move {
                let debit = BalanceAdjustment {
                    amount: dec!(30),
                    direction: LedgerDirection::Debit,
                    description: "Retirada".into(),
                };
                state.finance_service.adjust_balance(account.id, &debit, &actor).await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("erro inesperado: {other}"),
        }
    }

    assert_eq!(succeeded, 3);
    let account_now: BankAccount = fx.load(account.id).await;
    assert_eq!(account_now.current_balance, dec!(10));

    let report = fx.state.finance_service.reconcile_account(account.id).await.unwrap();
    assert!(report.consistent);
    assert_eq!(report.movements, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exits_never_go_below_zero() {
    let fx = Fixture::with_attempts(64);
    let product = fx.product("Carne moída", dec!(10), dec!(20)).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = fx.state.clone();
            let actor = fx.actor.clone();
            tokio::spawn(async move {
                let exit = StockAdjustment {
                    product_id: product.id,
                    quantity: dec!(3),
                    direction: StockDirection::Exit,
                    notes: "Perda na câmara fria".into(),
                };
                state.inventory_service.adjust_stock(&exit, &actor).await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientStock { .. }) => {}
            Err(other) => panic!("erro inesperado: {other}"),
        }
    }

    assert_eq!(succeeded, 3);
    let product_now: Product = fx.load(product.id).await;
    assert_eq!(product_now.quantity, dec!(1));

    let report = fx.state.inventory_service.reconcile_product(product.id).await.unwrap();
    assert!(report.consistent);
    // INITIAL_STOCK + 3 saídas
    assert_eq!(report.movements, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_settlements_pay_a_payable_once() {
    let fx = Fixture::with_attempts(64);
    let supplier = fx.supplier().await;
    let reference = fx.account("Referência", dec!(0)).await;
    let product = fx.product("Costela", dec!(0), dec!(1)).await;
    fx.state
        .purchase_service
        .register_purchase(
            &installment_purchase(supplier.id, reference.id, &[(product.id, dec!(1), dec!(250))], 1, date(2025, 3, 1)),
            &fx.actor,
        )
        .await
        .unwrap();
    let entry = fx.all::<PayableEntry>().await.remove(0);
    let account = fx.account("Pagadora", dec!(1000)).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = fx.state.clone();
            let actor = fx.actor.clone();
            tokio::spawn(async move { state.finance_service.settle_payable(entry.id, account.id, &actor).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::EntryAlreadySettled(id)) => assert_eq!(id, entry.id),
            Err(other) => panic!("erro inesperado: {other}"),
        }
    }

    assert_eq!(succeeded, 1);
    let entry: PayableEntry = fx.load(entry.id).await;
    assert_eq!(entry.status, PayableStatus::Paid);

    let debits: Vec<BankMovement> = fx
        .all::<BankMovement>()
        .await
        .into_iter()
        .filter(|m| m.account_id == account.id)
        .collect();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].reference_id, Some(entry.id));

    let account_now: BankAccount = fx.load(account.id).await;
    assert_eq!(account_now.current_balance, dec!(750));
    assert!(fx.state.finance_service.reconcile_account(account.id).await.unwrap().consistent);
}
