// src/models/status.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use utoipa::ToSchema;

use crate::common::error::AppError;

/// Tabela de transições de um status. Qualquer par fora da tabela é rejeitado.
pub trait Transition: Copy + PartialEq + Debug {
    const ENTITY: &'static str;

    fn allows(self, next: Self) -> bool;

    fn is_terminal(self) -> bool;
}

/// Valida `from -> to` contra a tabela e devolve o novo status.
pub fn transition<S: Transition>(from: S, to: S) -> Result<S, AppError> {
    if from.allows(to) {
        Ok(to)
    } else {
        Err(AppError::InvalidTransition {
            entity: S::ENTITY,
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        })
    }
}

// --- Cadastros (produtos, fornecedores, clientes, contas, abates) ---
// Reativação é uma ação explícita, não uma reversão de efeitos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl Transition for RecordStatus {
    const ENTITY: &'static str = "cadastro";

    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RecordStatus::Active, RecordStatus::Inactive) | (RecordStatus::Inactive, RecordStatus::Active)
        )
    }

    fn is_terminal(self) -> bool {
        false
    }
}

/// Cadastros que podem ser ativados/inativados explicitamente.
pub trait HasRecordStatus {
    fn record_status(&self) -> RecordStatus;

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>);
}

/// Payload de ativação/inativação de cadastros.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: RecordStatus,
}

/// Filtro opcional de status nas listagens (`?status=PENDING`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

// --- Compras ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Active,
    Cancelled,
}

impl Transition for PurchaseStatus {
    const ENTITY: &'static str = "compra";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (PurchaseStatus::Active, PurchaseStatus::Cancelled))
    }

    fn is_terminal(self) -> bool {
        self == PurchaseStatus::Cancelled
    }
}

// --- Vendas ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Pending,
    Paid,
    Cancelled,
}

impl Transition for SaleStatus {
    const ENTITY: &'static str = "venda";

    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Paid)
                | (SaleStatus::Pending, SaleStatus::Cancelled)
                | (SaleStatus::Paid, SaleStatus::Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        self == SaleStatus::Cancelled
    }
}

// --- Despesas ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Pending,
    Paid,
}

impl Transition for ExpenseStatus {
    const ENTITY: &'static str = "despesa";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (ExpenseStatus::Pending, ExpenseStatus::Paid))
    }

    fn is_terminal(self) -> bool {
        self == ExpenseStatus::Paid
    }
}

// --- Contas a Pagar ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayableStatus {
    Pending,
    Paid,
}

impl Transition for PayableStatus {
    const ENTITY: &'static str = "conta a pagar";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (PayableStatus::Pending, PayableStatus::Paid))
    }

    fn is_terminal(self) -> bool {
        self == PayableStatus::Paid
    }
}

// --- Contas a Receber ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceivableStatus {
    Pending,
    Received,
}

impl Transition for ReceivableStatus {
    const ENTITY: &'static str = "conta a receber";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (ReceivableStatus::Pending, ReceivableStatus::Received))
    }

    fn is_terminal(self) -> bool {
        self == ReceivableStatus::Received
    }
}
