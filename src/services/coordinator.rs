// src/services/coordinator.rs

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{store::DocumentStore, transaction::Transaction},
};

/// Uma operação de negócio executada como unidade atômica.
///
/// `execute` pode rodar mais de uma vez (nova tentativa após conflito);
/// cada execução recebe um escopo novo e precisa reler tudo o que usa.
#[async_trait]
pub trait TransactionalOp: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn execute(&self, tx: &mut Transaction<'_>) -> Result<Self::Output, AppError>;
}

#[derive(Clone)]
pub struct TransactionCoordinator {
    store: Arc<dyn DocumentStore>,
    max_attempts: u32,
}

impl TransactionCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Executa `op` e grava tudo ou nada.
    /// - erro de validação/invariante: aborta na hora, zero gravações;
    /// - `CommitConflict`: tenta de novo com leituras frescas até `max_attempts`.
    pub async fn run<O: TransactionalOp>(&self, op: &O) -> Result<O::Output, AppError> {
        let mut attempt = 1;

        loop {
            let mut tx = Transaction::new(self.store.as_ref());

            let output = match op.execute(&mut tx).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::debug!(op = op.name(), attempt, error = %e, "Operação abortada sem gravações");
                    return Err(e);
                }
            };

            match tx.commit().await {
                Ok(written) => {
                    tracing::debug!(op = op.name(), attempt, written, "✅ Escopo atômico confirmado");
                    return Ok(output);
                }
                Err(AppError::CommitConflict) if attempt < self.max_attempts => {
                    tracing::warn!(op = op.name(), attempt, "Conflito de gravação, relendo e tentando de novo");
                    attempt += 1;
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    if matches!(e, AppError::CommitConflict) {
                        tracing::warn!(op = op.name(), attempt, "Conflito de gravação, tentativas esgotadas");
                    }
                    return Err(e);
                }
            }
        }
    }
}
