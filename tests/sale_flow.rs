mod common;

use common::{cash_sale, date, installment_sale, Fixture};
use rust_decimal_macros::dec;

use gestao_backend::{
    common::error::AppError,
    models::{
        finance::{BankAccount, BankMovement, LedgerReason, ReceivableEntry},
        inventory::{Product, StockMovement, StockReason},
        operations::Sale,
        status::{ReceivableStatus, SaleStatus},
    },
};

#[tokio::test]
async fn selling_more_than_available_changes_nothing() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(0)).await;
    let product = fx.product("Picanha", dec!(5), dec!(40)).await;

    let result = fx
        .state
        .sale_service
        .register_sale(&cash_sale(account.id, None, &[(product.id, dec!(10), dec!(70))]), &fx.actor)
        .await;

    match result {
        Err(AppError::InsufficientStock { product_id, available, requested, .. }) => {
            assert_eq!(product_id, product.id);
            assert_eq!(available, dec!(5));
            assert_eq!(requested, dec!(10));
        }
        other => panic!("esperado InsufficientStock, veio {:?}", other.map(|s| s.id)),
    }

    assert!(fx.all::<Sale>().await.is_empty());
    assert!(fx.all::<ReceivableEntry>().await.is_empty());
    let product: Product = fx.load(product.id).await;
    assert_eq!(product.quantity, dec!(5));
    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(0));
}

#[tokio::test]
async fn repeated_lines_of_the_same_product_are_checked_together() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(0)).await;
    let product = fx.product("Maminha", dec!(5), dec!(30)).await;

    let result = fx
        .state
        .sale_service
        .register_sale(
            &cash_sale(account.id, None, &[(product.id, dec!(3), dec!(50)), (product.id, dec!(3), dec!(50))]),
            &fx.actor,
        )
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock { requested, .. }) if requested == dec!(6)));
    let product: Product = fx.load(product.id).await;
    assert_eq!(product.quantity, dec!(5));
}

#[tokio::test]
async fn cash_sale_is_paid_and_received_at_once() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(100)).await;
    let customer = fx.customer().await;
    let product = fx.product("Alcatra", dec!(10), dec!(30)).await;

    let sale = fx
        .state
        .sale_service
        .register_sale(&cash_sale(account.id, Some(customer.id), &[(product.id, dec!(4), dec!(50))]), &fx.actor)
        .await
        .unwrap();

    assert_eq!(sale.status, SaleStatus::Paid);
    assert_eq!(sale.total, dec!(200));
    assert_eq!(sale.total_cost, dec!(120));
    assert_eq!(sale.margin(), dec!(80));
    assert_eq!(sale.items[0].unit_cost, dec!(30));

    let product: Product = fx.load(product.id).await;
    assert_eq!(product.quantity, dec!(6));
    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(300));

    let receivables: Vec<ReceivableEntry> = fx.all().await;
    assert_eq!(receivables.len(), 1);
    assert_eq!(receivables[0].status, ReceivableStatus::Received);
    assert_eq!(receivables[0].received_in_account_id, Some(account.id));
    assert_eq!(receivables[0].description, "Venda - Mercado São José");

    let bank: Vec<BankMovement> = fx.all().await;
    assert_eq!(bank.len(), 1);
    assert_eq!(bank[0].reason, LedgerReason::Sale);
    assert_eq!(bank[0].amount, dec!(200));

    let exits: Vec<StockMovement> = fx
        .all::<StockMovement>()
        .await
        .into_iter()
        .filter(|m| m.reason == StockReason::Sale)
        .collect();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].quantity, dec!(-4));
    assert_eq!(exits[0].reference_id, Some(sale.id));
}

#[tokio::test]
async fn deferred_sale_becomes_paid_when_last_installment_is_received() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(0)).await;
    let product = fx.product("Fraldinha", dec!(10), dec!(20)).await;

    let sale = fx
        .state
        .sale_service
        .register_sale(
            &installment_sale(account.id, None, &[(product.id, dec!(2), dec!(50))], 2, date(2025, 2, 15)),
            &fx.actor,
        )
        .await
        .unwrap();
    assert_eq!(sale.status, SaleStatus::Pending);

    let mut receivables: Vec<ReceivableEntry> = fx.all().await;
    receivables.sort_by_key(|r| r.due_date);
    assert_eq!(receivables.len(), 2);
    assert!(receivables.iter().all(|r| r.amount == dec!(50) && r.description == "Venda avulsa"));

    let finance = &fx.state.finance_service;
    finance.settle_receivable(receivables[0].id, account.id, &fx.actor).await.unwrap();
    let halfway: Sale = fx.load(sale.id).await;
    assert_eq!(halfway.status, SaleStatus::Pending);

    finance.settle_receivable(receivables[1].id, account.id, &fx.actor).await.unwrap();
    let settled: Sale = fx.load(sale.id).await;
    assert_eq!(settled.status, SaleStatus::Paid);

    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(100));
}

#[tokio::test]
async fn cancelling_a_sale_does_not_return_stock() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(0)).await;
    let product = fx.product("Patinho", dec!(10), dec!(20)).await;
    let sale = fx
        .state
        .sale_service
        .register_sale(&cash_sale(account.id, None, &[(product.id, dec!(3), dec!(40))]), &fx.actor)
        .await
        .unwrap();

    let cancelled = fx.state.sale_service.cancel_sale(sale.id).await.unwrap();
    assert_eq!(cancelled.status, SaleStatus::Cancelled);

    let product: Product = fx.load(product.id).await;
    assert_eq!(product.quantity, dec!(7));
    let account: BankAccount = fx.load(account.id).await;
    assert_eq!(account.current_balance, dec!(120));

    assert!(matches!(
        fx.state.sale_service.cancel_sale(sale.id).await,
        Err(AppError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn inactive_customer_cannot_buy() {
    let fx = Fixture::new();
    let account = fx.account("Caixa", dec!(0)).await;
    let customer = fx.customer().await;
    let product = fx.product("Contrafilé", dec!(10), dec!(20)).await;
    fx.state
        .crm_service
        .set_customer_status(customer.id, gestao_backend::models::status::RecordStatus::Inactive)
        .await
        .unwrap();

    let result = fx
        .state
        .sale_service
        .register_sale(&cash_sale(account.id, Some(customer.id), &[(product.id, dec!(1), dec!(40))]), &fx.actor)
        .await;

    assert!(matches!(result, Err(AppError::ValidationFailed(_))));
    assert!(fx.all::<Sale>().await.is_empty());
}
