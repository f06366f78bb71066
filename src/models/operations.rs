// src/models/operations.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{validate_not_negative, validate_positive},
    },
    db::store::Document,
    models::status::{HasRecordStatus, PurchaseStatus, RecordStatus, SaleStatus},
};

// --- Condições de pagamento ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentTerms {
    #[serde(rename = "A_VISTA")]
    Cash,
    #[serde(rename = "A_PRAZO")]
    Installments,
}

/// Limite de parcelas de uma compra/venda a prazo (10 anos, mês a mês).
pub const MAX_INSTALLMENTS: u32 = 120;

/// Plano de pagamento já validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPlan {
    Immediate,
    Installments { count: u32, first_due_date: NaiveDate },
}

impl PaymentPlan {
    /// Monta o plano a partir do payload. A_PRAZO exige número de parcelas e primeiro vencimento.
    pub fn from_terms(
        terms: PaymentTerms,
        installments: Option<u32>,
        first_due_date: Option<NaiveDate>,
    ) -> Result<Self, AppError> {
        match terms {
            PaymentTerms::Cash => Ok(PaymentPlan::Immediate),
            PaymentTerms::Installments => {
                let count = installments
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| AppError::validation("Compra/venda a prazo exige ao menos 1 parcela"))?;
                if count > MAX_INSTALLMENTS {
                    return Err(AppError::validation(format!(
                        "Compra/venda a prazo aceita no máximo {} parcelas",
                        MAX_INSTALLMENTS
                    )));
                }
                let first_due_date = first_due_date
                    .ok_or_else(|| AppError::validation("Informe a data do primeiro vencimento"))?;
                Ok(PaymentPlan::Installments { count, first_due_date })
            }
        }
    }

    pub fn installment_count(&self) -> u32 {
        match self {
            PaymentPlan::Immediate => 1,
            PaymentPlan::Installments { count, .. } => *count,
        }
    }
}

// =============================================================================
//  COMPRAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub account_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub items: Vec<PurchaseItem>,
    #[schema(example = "900.00")]
    pub total: Decimal,
    pub payment_terms: PaymentTerms,
    pub installments: u32,
    pub status: PurchaseStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Purchase {
    const COLLECTION: &'static str = "purchases";
    const LABEL: &'static str = "Compra";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseItem {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    #[validate(required(message = "O fornecedor é obrigatório."))]
    pub supplier_id: Option<Uuid>,

    // Conta que paga a compra (à vista) ou de referência (a prazo)
    pub account_id: Option<Uuid>,

    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Informe ao menos um item."), nested)]
    pub items: Vec<NewPurchaseItem>,

    pub payment_terms: PaymentTerms,

    #[serde(alias = "numeroParcelas")]
    #[validate(range(min = 1, max = 120, message = "O número de parcelas deve estar entre 1 e 120."))]
    pub installments: Option<u32>,

    #[schema(value_type = Option<String>, format = Date)]
    pub first_due_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

// =============================================================================
//  VENDAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Custo do produto no momento da venda (para margem)
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub account_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub items: Vec<SaleItem>,
    pub total: Decimal,
    pub total_cost: Decimal,
    pub payment_terms: PaymentTerms,
    pub installments: u32,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    pub fn margin(&self) -> Decimal {
        self.total - self.total_cost
    }
}

impl Document for Sale {
    const COLLECTION: &'static str = "sales";
    const LABEL: &'static str = "Venda";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleItem {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_id: Option<Uuid>,

    // Conta que recebe o pagamento
    pub account_id: Option<Uuid>,

    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Informe ao menos um item."), nested)]
    pub items: Vec<NewSaleItem>,

    pub payment_terms: PaymentTerms,

    #[serde(alias = "numeroParcelas")]
    #[validate(range(min = 1, max = 120, message = "O número de parcelas deve estar entre 1 e 120."))]
    pub installments: Option<u32>,

    #[schema(value_type = Option<String>, format = Date)]
    pub first_due_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

// =============================================================================
//  ABATE E PRODUÇÃO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slaughter {
    pub id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub supplier_id: Option<Uuid>,
    #[schema(example = 12)]
    pub head_count: u32,
    #[schema(example = "5400.0")]
    pub live_weight: Decimal,
    pub carcass_weight: Option<Decimal>,
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Slaughter {
    const COLLECTION: &'static str = "slaughters";
    const LABEL: &'static str = "Abate";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasRecordStatus for Slaughter {
    fn record_status(&self) -> RecordStatus {
        self.status
    }

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSlaughter {
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,

    pub supplier_id: Option<Uuid>,

    #[validate(range(min = 1, message = "Informe a quantidade de cabeças."))]
    pub head_count: u32,

    #[validate(custom(function = "validate_positive"))]
    pub live_weight: Decimal,

    pub carcass_weight: Option<Decimal>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProducedItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    /// Perda/quebra: registrada, mas nunca entra no estoque
    pub loss_quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRun {
    pub id: Uuid,
    pub slaughter_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub items: Vec<ProducedItem>,
    pub total_produced: Decimal,
    pub total_loss: Decimal,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Document for ProductionRun {
    const COLLECTION: &'static str = "production_runs";
    const LABEL: &'static str = "Produção";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProducedItem {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub loss_quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProductionRun {
    #[validate(required(message = "O abate de origem é obrigatório."))]
    pub slaughter_id: Option<Uuid>,

    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "Informe ao menos um item produzido."), nested)]
    pub items: Vec<NewProducedItem>,

    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installment_terms_need_count_and_first_due_date() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        assert_eq!(
            PaymentPlan::from_terms(PaymentTerms::Installments, Some(3), Some(d)).unwrap(),
            PaymentPlan::Installments { count: 3, first_due_date: d }
        );
        assert!(PaymentPlan::from_terms(PaymentTerms::Installments, None, Some(d)).is_err());
        assert!(PaymentPlan::from_terms(PaymentTerms::Installments, Some(0), Some(d)).is_err());
        assert!(PaymentPlan::from_terms(PaymentTerms::Installments, Some(2), None).is_err());
        assert!(PaymentPlan::from_terms(PaymentTerms::Installments, Some(MAX_INSTALLMENTS), Some(d)).is_ok());
        assert!(matches!(
            PaymentPlan::from_terms(PaymentTerms::Installments, Some(MAX_INSTALLMENTS + 1), Some(d)),
            Err(AppError::ValidationFailed(_))
        ));
        assert_eq!(
            PaymentPlan::from_terms(PaymentTerms::Cash, Some(5), None).unwrap(),
            PaymentPlan::Immediate
        );
    }

    #[test]
    fn payload_accepts_portuguese_installment_field() {
        let json = serde_json::json!({
            "supplierId": Uuid::new_v4(),
            "accountId": Uuid::new_v4(),
            "items": [{ "productId": Uuid::new_v4(), "quantity": "3", "unitCost": "300" }],
            "paymentTerms": "A_PRAZO",
            "numeroParcelas": 3,
            "firstDueDate": "2025-02-10"
        });
        let payload: NewPurchase = serde_json::from_value(json).unwrap();

        assert_eq!(payload.payment_terms, PaymentTerms::Installments);
        assert_eq!(payload.installments, Some(3));
    }

    fn purchase_payload(items: serde_json::Value, installments: u32) -> NewPurchase {
        serde_json::from_value(serde_json::json!({
            "supplierId": Uuid::new_v4(),
            "accountId": Uuid::new_v4(),
            "items": items,
            "paymentTerms": "A_PRAZO",
            "numeroParcelas": installments,
            "firstDueDate": "2025-02-10"
        }))
        .unwrap()
    }

    #[test]
    fn payload_validation_reaches_each_item() {
        let payload = purchase_payload(
            serde_json::json!([
                { "productId": Uuid::new_v4(), "quantity": "2", "unitCost": "10" },
                { "productId": Uuid::new_v4(), "quantity": "0", "unitCost": "10" }
            ]),
            2,
        );

        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn payload_rejects_too_many_installments() {
        let items = serde_json::json!([{ "productId": Uuid::new_v4(), "quantity": "1", "unitCost": "10" }]);

        assert!(purchase_payload(items.clone(), MAX_INSTALLMENTS).validate().is_ok());
        let errors = purchase_payload(items, 200_000).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("installments"));
    }
}
