// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Taxonomia de erros do núcleo transacional + erros da camada HTTP.
// Nenhum erro é "engolido": tudo sobe até quem chamou a operação de negócio.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} não encontrado(a): {id}")]
    EntityNotFound { entity: &'static str, id: Uuid },

    #[error("Estoque insuficiente para '{product_name}': disponível {available}, solicitado {requested}")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Saldo insuficiente na conta '{account_name}': saldo {balance}, solicitado {requested}")]
    InsufficientFunds {
        account_id: Uuid,
        account_name: String,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("Dados inválidos: {0}")]
    ValidationFailed(String),

    #[error("Erro de validação")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Lançamento {0} já foi liquidado")]
    EntryAlreadySettled(Uuid),

    #[error("Transição de status inválida em {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Conflito de gravação: os dados foram alterados por outra operação")]
    CommitConflict,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão '{0}' necessária para esta ação")]
    Forbidden(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        AppError::EntityNotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationFailed(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. }
            | AppError::InsufficientFunds { .. }
            | AppError::EntryAlreadySettled(_)
            | AppError::InvalidTransition { .. }
            | AppError::CommitConflict => StatusCode::CONFLICT,
            AppError::ValidationFailed(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::Serialization(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::Validation(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::InsufficientStock { product_id, available, requested, .. } => json!({
                "error": self.to_string(),
                "productId": product_id,
                "available": available,
                "requested": requested,
            }),
            AppError::InsufficientFunds { account_id, balance, requested, .. } => json!({
                "error": self.to_string(),
                "accountId": account_id,
                "balance": balance,
                "requested": requested,
            }),
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
