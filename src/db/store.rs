// src/db/store.rs

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::common::error::AppError;

/// Um documento persistido numa coleção, identificado por `id`.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Nome usado nas mensagens de erro (ex: "Produto").
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
}

// ---
// Tipos trocados com o backend
// ---

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub version: i64,
    pub body: Value,
}

impl StoredDocument {
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AppError> {
        Ok(serde_json::from_value(self.body)?)
    }
}

/// Versão observada numa leitura. `None` = documento não existia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStamp {
    pub collection: String,
    pub id: Uuid,
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update { expected_version: i64 },
}

#[derive(Debug, Clone)]
pub struct WriteOp {
    pub collection: String,
    pub id: Uuid,
    pub kind: WriteKind,
    pub body: Value,
}

/// Tudo o que um escopo transacional leu e quer gravar.
/// O backend aplica tudo ou nada.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub reads: Vec<ReadStamp>,
    pub writes: Vec<WriteOp>,
}

// ---
// Filtro de consultas: igualdade em campos de primeiro nível
// ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<V: Serialize>(mut self, field: &str, value: V) -> Self {
        self.fields.insert(field.to_string(), json!(value));
        self
    }

    pub fn matches(&self, body: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }

    /// Objeto JSON usado como `body @> $filtro` no Postgres.
    pub fn as_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

// ---
// Feed de mudanças (assinaturas "ao vivo" para a interface)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: Uuid,
    pub kind: ChangeKind,
    pub body: Value,
}

impl From<&WriteOp> for ChangeEvent {
    fn from(op: &WriteOp) -> Self {
        let kind = match op.kind {
            WriteKind::Create => ChangeKind::Created,
            WriteKind::Update { .. } => ChangeKind::Updated,
        };
        Self {
            collection: op.collection.clone(),
            id: op.id,
            kind,
            body: op.body.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publica as gravações de um commit que já foi aplicado.
    pub fn publish(&self, writes: &[WriteOp]) {
        for op in writes {
            // Sem assinantes o envio falha, e tudo bem.
            let _ = self.sender.send(ChangeEvent::from(op));
        }
    }

    pub fn subscribe(&self, collection: &str, filter: Filter) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            collection: collection.to_string(),
            filter,
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(1024)
    }
}

pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    collection: String,
    filter: Filter,
}

impl Subscription {
    /// Próxima mudança que bate com a coleção e o filtro.
    /// `None` quando o armazenamento foi encerrado.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if event.collection == self.collection && self.filter.matches(&event.body) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(collection = %self.collection, skipped, "Assinatura atrasada, eventos descartados");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---
// O contrato do armazenamento
// ---

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Leitura pontual do estado atual.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError>;

    /// Consulta síncrona, em ordem de criação.
    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, AppError>;

    /// Valida todas as leituras e aplica todas as gravações de forma atômica.
    /// Falha com `CommitConflict` sem aplicar nada se alguma leitura ficou velha.
    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError>;

    /// Assinatura push das mudanças de uma coleção. O núcleo transacional não usa.
    fn subscribe(&self, collection: &str, filter: Filter) -> Subscription;
}

// Leituras tipadas fora de um escopo transacional (listagens, detalhes)
pub async fn fetch_all<T: Document>(store: &dyn DocumentStore, filter: &Filter) -> Result<Vec<T>, AppError> {
    store
        .query(T::COLLECTION, filter)
        .await?
        .into_iter()
        .map(StoredDocument::decode)
        .collect()
}

pub async fn fetch_one<T: Document>(store: &dyn DocumentStore, id: Uuid) -> Result<T, AppError> {
    store
        .get(T::COLLECTION, id)
        .await?
        .ok_or_else(|| AppError::not_found(T::LABEL, id))?
        .decode()
}
