// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::{validate_not_negative, validate_positive},
    db::store::Document,
    models::status::{HasRecordStatus, RecordStatus},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductKind {
    ForSale,     // Produto para venda
    RawMaterial, // Matéria-prima
    InternalUse, // Uso interno
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockDirection {
    Entry,
    Exit,
}

impl StockDirection {
    /// Quantidade com sinal: entrada soma, saída subtrai.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            StockDirection::Entry => quantity,
            StockDirection::Exit => -quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockReason {
    InitialStock,
    Purchase,
    Sale,
    Production,
    Adjustment,
}

// --- Produto ---
// A quantidade é um cache: só muda junto com uma StockMovement no mesmo escopo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Linguiça Toscana")]
    pub name: String,
    pub sku: Option<String>,
    pub kind: ProductKind,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = "12.5")]
    pub quantity: Decimal,
    #[schema(example = "18.90")]
    pub unit_cost: Decimal,
    pub sale_price: Option<Decimal>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Product {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Produto";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasRecordStatus for Product {
    fn record_status(&self) -> RecordStatus {
        self.status
    }

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

// --- Movimentação de Estoque (imutável, só inserção) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Positivo = entrada, negativo = saída
    #[schema(example = "-2.5")]
    pub quantity: Decimal,
    pub direction: StockDirection,
    pub reason: StockReason,
    pub notes: Option<String>,
    /// Documento de origem (compra, venda, produção)
    pub reference_id: Option<Uuid>,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub created_at: DateTime<Utc>,
}

impl Document for StockMovement {
    const COLLECTION: &'static str = "stock_movements";
    const LABEL: &'static str = "Movimentação de estoque";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- Payloads ---

fn default_unit() -> String {
    "un".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub sku: Option<String>,

    pub kind: ProductKind,

    #[serde(default = "default_unit")]
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,

    pub sale_price: Option<Decimal>,

    // Se vier maior que zero, gera uma movimentação INITIAL_STOCK
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub initial_stock: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub direction: StockDirection,

    #[validate(length(min = 1, message = "Informe o motivo do ajuste."))]
    pub notes: String,
}
