// Fixtures compartilhadas pelos testes de integração.
#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use gestao_backend::{
    config::AppState,
    db::{store::Document, DocumentStore, Filter, MemoryDocumentStore},
    models::{
        auth::Actor,
        crm::{Customer, NewPartner, Supplier},
        finance::{BankAccount, NewBankAccount},
        inventory::{NewProduct, Product, ProductKind},
        operations::{NewPurchase, NewPurchaseItem, NewSale, NewSaleItem, PaymentTerms},
    },
};

pub const JWT_SECRET: &str = "segredo-de-teste";

pub struct Fixture {
    pub state: AppState,
    pub actor: Actor,
    store: Arc<dyn DocumentStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_attempts(5)
    }

    pub fn with_attempts(max_commit_attempts: u32) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        Self {
            state: AppState::with_store(store.clone(), JWT_SECRET.to_string(), max_commit_attempts),
            actor: Actor::new(Uuid::new_v4(), "Operador de Teste"),
            store,
        }
    }

    pub async fn product(&self, name: &str, stock: Decimal, unit_cost: Decimal) -> Product {
        self.state
            .inventory_service
            .create_product(
                &NewProduct {
                    name: name.to_string(),
                    sku: None,
                    kind: ProductKind::ForSale,
                    unit: "kg".to_string(),
                    unit_cost,
                    sale_price: None,
                    initial_stock: stock,
                },
                &self.actor,
            )
            .await
            .unwrap()
    }

    pub async fn account(&self, name: &str, balance: Decimal) -> BankAccount {
        self.state
            .finance_service
            .create_account(&NewBankAccount {
                name: name.to_string(),
                bank_name: None,
                initial_balance: balance,
            })
            .await
            .unwrap()
    }

    pub async fn supplier(&self) -> Supplier {
        self.state
            .crm_service
            .create_supplier(&partner("Frigorífico Boa Vista"))
            .await
            .unwrap()
    }

    pub async fn customer(&self) -> Customer {
        self.state
            .crm_service
            .create_customer(&partner("Mercado São José"))
            .await
            .unwrap()
    }

    /// Lê o estado atual de um documento direto do armazenamento.
    pub async fn load<T: Document>(&self, id: Uuid) -> T {
        self.store
            .get(T::COLLECTION, id)
            .await
            .unwrap()
            .unwrap()
            .decode()
            .unwrap()
    }

    pub async fn all<T: Document>(&self) -> Vec<T> {
        self.store
            .query(T::COLLECTION, &Filter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.decode().unwrap())
            .collect()
    }
}

fn partner(name: &str) -> NewPartner {
    NewPartner {
        name: name.to_string(),
        document_number: None,
        email: None,
        phone: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn cash_purchase(supplier_id: Uuid, account_id: Uuid, lines: &[(Uuid, Decimal, Decimal)]) -> NewPurchase {
    NewPurchase {
        supplier_id: Some(supplier_id),
        account_id: Some(account_id),
        date: Some(date(2025, 1, 10)),
        items: lines
            .iter()
            .map(|&(product_id, quantity, unit_cost)| NewPurchaseItem { product_id, quantity, unit_cost })
            .collect(),
        payment_terms: PaymentTerms::Cash,
        installments: None,
        first_due_date: None,
        notes: None,
    }
}

pub fn installment_purchase(
    supplier_id: Uuid,
    account_id: Uuid,
    lines: &[(Uuid, Decimal, Decimal)],
    installments: u32,
    first_due_date: NaiveDate,
) -> NewPurchase {
    NewPurchase {
        payment_terms: PaymentTerms::Installments,
        installments: Some(installments),
        first_due_date: Some(first_due_date),
        ..cash_purchase(supplier_id, account_id, lines)
    }
}

pub fn cash_sale(account_id: Uuid, customer_id: Option<Uuid>, lines: &[(Uuid, Decimal, Decimal)]) -> NewSale {
    NewSale {
        customer_id,
        account_id: Some(account_id),
        date: Some(date(2025, 1, 15)),
        items: lines
            .iter()
            .map(|&(product_id, quantity, unit_price)| NewSaleItem { product_id, quantity, unit_price })
            .collect(),
        payment_terms: PaymentTerms::Cash,
        installments: None,
        first_due_date: None,
        notes: None,
    }
}

pub fn installment_sale(
    account_id: Uuid,
    customer_id: Option<Uuid>,
    lines: &[(Uuid, Decimal, Decimal)],
    installments: u32,
    first_due_date: NaiveDate,
) -> NewSale {
    NewSale {
        payment_terms: PaymentTerms::Installments,
        installments: Some(installments),
        first_due_date: Some(first_due_date),
        ..cash_sale(account_id, customer_id, lines)
    }
}
