// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::store::Document,
    models::status::{HasRecordStatus, RecordStatus},
};

// --- FORNECEDOR ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Frigorífico Boa Vista")]
    pub name: String,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Supplier {
    const COLLECTION: &'static str = "suppliers";
    const LABEL: &'static str = "Fornecedor";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasRecordStatus for Supplier {
    fn record_status(&self) -> RecordStatus {
        self.status
    }

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Mercado São José")]
    pub name: String,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Customer {
    const COLLECTION: &'static str = "customers";
    const LABEL: &'static str = "Cliente";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasRecordStatus for Customer {
    fn record_status(&self) -> RecordStatus {
        self.status
    }

    fn set_record_status(&mut self, status: RecordStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

// --- PAYLOAD (mesmo formato para fornecedor e cliente) ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub document_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
}
