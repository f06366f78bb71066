// src/db/crm_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::{fetch_all, DocumentStore, Filter},
    models::{
        crm::{Customer, Supplier},
        status::RecordStatus,
    },
};

#[derive(Clone)]
pub struct CrmRepository {
    store: Arc<dyn DocumentStore>,
}

impl CrmRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn filter(status: Option<RecordStatus>) -> Filter {
        match status {
            Some(status) => Filter::new().eq("status", status),
            None => Filter::new(),
        }
    }

    pub async fn list_suppliers(&self, status: Option<RecordStatus>) -> Result<Vec<Supplier>, AppError> {
        let mut suppliers: Vec<Supplier> = fetch_all(self.store.as_ref(), &Self::filter(status)).await?;
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    pub async fn list_customers(&self, status: Option<RecordStatus>) -> Result<Vec<Customer>, AppError> {
        let mut customers: Vec<Customer> = fetch_all(self.store.as_ref(), &Self::filter(status)).await?;
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }
}
