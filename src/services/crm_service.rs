// src/services/crm_service.rs

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{transaction::Transaction, CrmRepository},
    models::{
        crm::{Customer, NewPartner, Supplier},
        status::RecordStatus,
    },
    services::{
        coordinator::{TransactionCoordinator, TransactionalOp},
        record_status::SetRecordStatus,
    },
};

#[derive(Clone)]
pub struct CrmService {
    coordinator: TransactionCoordinator,
    repo: CrmRepository,
}

impl CrmService {
    pub fn new(coordinator: TransactionCoordinator, repo: CrmRepository) -> Self {
        Self { coordinator, repo }
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn create_supplier(&self, input: &NewPartner) -> Result<Supplier, AppError> {
        let supplier = self.coordinator.run(&CreatePartner::<Supplier>::new(input)).await?;
        tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "Fornecedor cadastrado");
        Ok(supplier)
    }

    pub async fn list_suppliers(&self, status: Option<RecordStatus>) -> Result<Vec<Supplier>, AppError> {
        self.repo.list_suppliers(status).await
    }

    pub async fn set_supplier_status(&self, supplier_id: Uuid, status: RecordStatus) -> Result<Supplier, AppError> {
        self.coordinator
            .run(&SetRecordStatus::<Supplier>::new(supplier_id, status))
            .await
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_customer(&self, input: &NewPartner) -> Result<Customer, AppError> {
        let customer = self.coordinator.run(&CreatePartner::<Customer>::new(input)).await?;
        tracing::info!(customer_id = %customer.id, name = %customer.name, "Cliente cadastrado");
        Ok(customer)
    }

    pub async fn list_customers(&self, status: Option<RecordStatus>) -> Result<Vec<Customer>, AppError> {
        self.repo.list_customers(status).await
    }

    pub async fn set_customer_status(&self, customer_id: Uuid, status: RecordStatus) -> Result<Customer, AppError> {
        self.coordinator
            .run(&SetRecordStatus::<Customer>::new(customer_id, status))
            .await
    }
}

/// Fornecedor e cliente têm o mesmo cadastro; só a coleção muda.
trait Partner: crate::db::store::Document + 'static {
    fn from_payload(input: &NewPartner) -> Self;
}

impl Partner for Supplier {
    fn from_payload(input: &NewPartner) -> Self {
        let now = Utc::now();
        Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            document_number: input.document_number.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Partner for Customer {
    fn from_payload(input: &NewPartner) -> Self {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            document_number: input.document_number.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

struct CreatePartner<'a, T> {
    input: &'a NewPartner,
    _doc: std::marker::PhantomData<fn() -> T>,
}

impl<'a, T> CreatePartner<'a, T> {
    fn new(input: &'a NewPartner) -> Self {
        Self { input, _doc: std::marker::PhantomData }
    }
}

#[async_trait]
impl<T: Partner> TransactionalOp for CreatePartner<'_, T> {
    type Output = T;

    fn name(&self) -> &'static str {
        "create_partner"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<T, AppError> {
        if self.input.name.trim().is_empty() {
            return Err(AppError::validation("O nome é obrigatório"));
        }
        let doc = T::from_payload(self.input);
        tx.insert(&doc)?;
        Ok(doc)
    }
}
