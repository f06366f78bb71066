// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::{validate_not_negative, validate_positive},
    db::store::Document,
    models::status::{ExpenseStatus, HasRecordStatus, PayableStatus, ReceivableStatus, RecordStatus},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerDirection {
    Credit, // Entrada
    Debit,  // Saída
}

impl LedgerDirection {
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            LedgerDirection::Credit => amount,
            LedgerDirection::Debit => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerReason {
    Purchase,
    Sale,
    PayableSettlement,
    ReceivableSettlement,
    Adjustment,
}

// --- Conta Bancária ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: Uuid,
    #[schema(example = "Conta Principal")]
    pub name: String,
    #[schema(example = "Banco do Brasil")]
    pub bank_name: Option<String>,
    #[schema(example = "1000.00")]
    pub initial_balance: Decimal,
    #[schema(example = "1500.50")]
    pub current_balance: Decimal,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for BankAccount {
    const COLLECTION: &'static str = "bank_accounts";
    const LABEL: &'static str = "Conta bancária";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasRecordStatus for BankAccount {
    fn record_status(&self) -> RecordStatus {
        self.status
    }

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

// --- Movimentação Bancária (imutável) ---
// Guarda saldo antes/depois para conciliar sem reprocessar o histórico.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankMovement {
    pub id: Uuid,
    pub account_id: Uuid,
    #[schema(example = "-150.00")]
    pub amount: Decimal,
    pub direction: LedgerDirection,
    pub reason: LedgerReason,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub created_at: DateTime<Utc>,
}

impl Document for BankMovement {
    const COLLECTION: &'static str = "bank_movements";
    const LABEL: &'static str = "Movimentação bancária";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- Contas a Pagar ---

/// Origem de uma conta a pagar: exatamente uma compra ou uma despesa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayableSource {
    Purchase(Uuid),
    Expense(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayableEntry {
    pub id: Uuid,
    pub source: PayableSource,
    pub supplier_id: Option<Uuid>,
    pub description: String,
    #[schema(example = "300.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub issue_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub due_date: NaiveDate,
    #[schema(example = "2/5")]
    pub installment: String,
    pub status: PayableStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_from_account_id: Option<Uuid>,
    pub settled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Document for PayableEntry {
    const COLLECTION: &'static str = "payables";
    const LABEL: &'static str = "Conta a pagar";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- Contas a Receber ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableEntry {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub installment: String,
    pub status: ReceivableStatus,
    pub received_at: Option<DateTime<Utc>>,
    pub received_in_account_id: Option<Uuid>,
    pub settled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Document for ReceivableEntry {
    const COLLECTION: &'static str = "receivables";
    const LABEL: &'static str = "Conta a receber";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- Despesa ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Conta de energia")]
    pub description: String,
    #[schema(example = "Utilidades")]
    pub category: String,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub status: ExpenseStatus,
    pub payable_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Expense {
    const COLLECTION: &'static str = "expenses";
    const LABEL: &'static str = "Despesa";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- Conciliação ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub entity_id: Uuid,
    pub cached: Decimal,
    pub replayed: Decimal,
    pub movements: usize,
    pub consistent: bool,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBankAccount {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub bank_name: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustment {
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    pub direction: LedgerDirection,

    #[validate(length(min = 1, message = "Informe o motivo da alteração."))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleEntry {
    #[validate(required(message = "Informe a conta bancária."))]
    pub account_id: Option<Uuid>,
}
