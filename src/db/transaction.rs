// src/db/transaction.rs

use anyhow::anyhow;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Document, DocumentStore, Filter, ReadStamp, WriteBatch, WriteKind, WriteOp},
};

type DocKey = (&'static str, Uuid);

/// Handle de leitura/escrita de um escopo atômico.
///
/// Regras do escopo:
/// - toda leitura ao armazenamento acontece antes da primeira gravação;
/// - um documento já lido pode ser relido a qualquer momento e reflete as
///   gravações pendentes do próprio escopo;
/// - nada é gravado até `commit`, que envia tudo num único `WriteBatch`.
pub struct Transaction<'s> {
    store: &'s dyn DocumentStore,
    reads: HashMap<DocKey, Option<i64>>,
    view: HashMap<DocKey, Value>,
    writes: Vec<WriteOp>,
}

impl<'s> Transaction<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            view: HashMap::new(),
            writes: Vec::new(),
        }
    }

    fn ensure_reads_allowed(&self, collection: &str, id: Option<Uuid>) -> Result<(), AppError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        Err(AppError::InternalServerError(anyhow!(
            "Leitura de '{}' ({:?}) depois de uma gravação no mesmo escopo",
            collection,
            id
        )))
    }

    /// Lê um documento. `None` se não existe.
    pub async fn read<T: Document>(&mut self, id: Uuid) -> Result<Option<T>, AppError> {
        let key = (T::COLLECTION, id);

        if let Some(body) = self.view.get(&key) {
            return Ok(Some(serde_json::from_value(body.clone())?));
        }
        if self.reads.contains_key(&key) {
            // Já lido e não existia
            return Ok(None);
        }

        self.ensure_reads_allowed(T::COLLECTION, Some(id))?;

        match self.store.get(T::COLLECTION, id).await? {
            Some(stored) => {
                self.reads.insert(key, Some(stored.version));
                self.view.insert(key, stored.body.clone());
                Ok(Some(stored.decode()?))
            }
            None => {
                self.reads.insert(key, None);
                Ok(None)
            }
        }
    }

    /// Lê um documento que precisa existir.
    pub async fn require<T: Document>(&mut self, id: Uuid) -> Result<T, AppError> {
        self.read::<T>(id)
            .await?
            .ok_or_else(|| AppError::not_found(T::LABEL, id))
    }

    /// Consulta uma coleção. Cada documento retornado entra no snapshot do escopo.
    pub async fn query<T: Document>(&mut self, filter: &Filter) -> Result<Vec<T>, AppError> {
        self.ensure_reads_allowed(T::COLLECTION, None)?;

        let found = self.store.query(T::COLLECTION, filter).await?;
        let mut docs = Vec::with_capacity(found.len());
        for stored in found {
            let key = (T::COLLECTION, stored.id);
            let body = match self.view.get(&key) {
                Some(body) => body.clone(),
                None => {
                    self.reads.insert(key, Some(stored.version));
                    self.view.insert(key, stored.body.clone());
                    stored.body
                }
            };
            docs.push(serde_json::from_value(body)?);
        }
        Ok(docs)
    }

    /// Enfileira a criação de um documento novo.
    pub fn insert<T: Document>(&mut self, doc: &T) -> Result<(), AppError> {
        let key = (T::COLLECTION, doc.id());
        if self.view.contains_key(&key) {
            return Err(AppError::InternalServerError(anyhow!(
                "{} {} já existe neste escopo",
                T::LABEL,
                doc.id()
            )));
        }

        let body = serde_json::to_value(doc)?;
        self.writes.push(WriteOp {
            collection: T::COLLECTION.to_string(),
            id: doc.id(),
            kind: WriteKind::Create,
            body: body.clone(),
        });
        self.view.insert(key, body);
        Ok(())
    }

    /// Enfileira a atualização de um documento lido neste escopo.
    /// Várias atualizações do mesmo documento viram uma só gravação.
    pub fn update<T: Document>(&mut self, doc: &T) -> Result<(), AppError> {
        let key = (T::COLLECTION, doc.id());
        if !self.view.contains_key(&key) {
            return Err(AppError::InternalServerError(anyhow!(
                "{} {} atualizado sem ter sido lido no escopo",
                T::LABEL,
                doc.id()
            )));
        }

        let body = serde_json::to_value(doc)?;
        let pending = self
            .writes
            .iter()
            .position(|op| op.collection == T::COLLECTION && op.id == doc.id());

        match pending {
            Some(index) => self.writes[index].body = body.clone(),
            None => {
                let expected_version = self
                    .reads
                    .get(&key)
                    .copied()
                    .flatten()
                    .ok_or_else(|| AppError::InternalServerError(anyhow!("versão lida ausente para {}", doc.id())))?;
                self.writes.push(WriteOp {
                    collection: T::COLLECTION.to_string(),
                    id: doc.id(),
                    kind: WriteKind::Update { expected_version },
                    body: body.clone(),
                });
            }
        }
        self.view.insert(key, body);
        Ok(())
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Envia leituras e gravações ao armazenamento. Escopos só de leitura não gravam nada.
    pub async fn commit(self) -> Result<usize, AppError> {
        if self.writes.is_empty() {
            return Ok(0);
        }

        let mut reads: Vec<ReadStamp> = self
            .reads
            .into_iter()
            .map(|((collection, id), version)| ReadStamp {
                collection: collection.to_string(),
                id,
                version,
            })
            .collect();
        reads.sort_by(|a, b| (a.collection.as_str(), a.id).cmp(&(b.collection.as_str(), b.id)));

        let written = self.writes.len();
        self.store.commit(WriteBatch { reads, writes: self.writes }).await?;
        Ok(written)
    }
}
