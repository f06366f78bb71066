// src/services/record_status.rs

use async_trait::async_trait;
use chrono::Utc;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{store::Document, transaction::Transaction},
    models::status::{transition, HasRecordStatus, RecordStatus},
    services::coordinator::TransactionalOp,
};

/// Ativa/inativa um cadastro. Só o status muda; movimentações passadas ficam como estão.
pub struct SetRecordStatus<T> {
    id: Uuid,
    status: RecordStatus,
    _doc: PhantomData<fn() -> T>,
}

impl<T> SetRecordStatus<T> {
    pub fn new(id: Uuid, status: RecordStatus) -> Self {
        Self { id, status, _doc: PhantomData }
    }
}

#[async_trait]
impl<T> TransactionalOp for SetRecordStatus<T>
where
    T: Document + HasRecordStatus + 'static,
{
    type Output = T;

    fn name(&self) -> &'static str {
        "set_record_status"
    }

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<T, AppError> {
        let mut doc: T = tx.require(self.id).await?;
        let next = transition(doc.record_status(), self.status)?;
        doc.set_record_status(next, Utc::now());
        tx.update(&doc)?;

        tracing::info!(entity = T::LABEL, id = %self.id, status = ?next, "Status do cadastro alterado");
        Ok(doc)
    }
}
