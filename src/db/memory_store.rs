// src/db/memory_store.rs

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{
        ChangeFeed, DocumentStore, Filter, StoredDocument, Subscription, WriteBatch, WriteKind,
    },
};

struct Entry {
    seq: u64,
    doc: StoredDocument,
}

#[derive(Default)]
struct Inner {
    docs: HashMap<(String, Uuid), Entry>,
    next_seq: u64,
}

/// Armazenamento em memória com controle de concorrência otimista.
/// O commit valida as versões lidas e aplica as gravações sob o mesmo lock de escrita.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Inner>,
    feed: ChangeFeed,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .get(&(collection.to_string(), id))
            .map(|entry| entry.doc.clone()))
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, AppError> {
        let inner = self.inner.read().await;
        let mut found: Vec<&Entry> = inner
            .docs
            .iter()
            .filter(|(key, entry)| key.0 == collection && filter.matches(&entry.doc.body))
            .map(|(_, entry)| entry)
            .collect();
        found.sort_by_key(|entry| entry.seq);
        Ok(found.into_iter().map(|entry| entry.doc.clone()).collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;

        // 1. Valida o snapshot lido
        for stamp in &batch.reads {
            let current = inner
                .docs
                .get(&(stamp.collection.clone(), stamp.id))
                .map(|entry| entry.doc.version);
            if current != stamp.version {
                return Err(AppError::CommitConflict);
            }
        }

        // 2. Valida as gravações antes de aplicar qualquer uma
        for op in &batch.writes {
            let current = inner
                .docs
                .get(&(op.collection.clone(), op.id))
                .map(|entry| entry.doc.version);
            let ok = match op.kind {
                WriteKind::Create => current.is_none(),
                WriteKind::Update { expected_version } => current == Some(expected_version),
            };
            if !ok {
                return Err(AppError::CommitConflict);
            }
        }

        // 3. Aplica tudo
        for op in &batch.writes {
            let key = (op.collection.clone(), op.id);
            match op.kind {
                WriteKind::Create => {
                    let seq = inner.next_seq;
                    inner.next_seq += 1;
                    inner.docs.insert(
                        key,
                        Entry {
                            seq,
                            doc: StoredDocument { id: op.id, version: 1, body: op.body.clone() },
                        },
                    );
                }
                WriteKind::Update { expected_version } => {
                    if let Some(entry) = inner.docs.get_mut(&key) {
                        entry.doc.version = expected_version + 1;
                        entry.doc.body = op.body.clone();
                    }
                }
            }
        }
        drop(inner);

        self.feed.publish(&batch.writes);
        Ok(())
    }

    fn subscribe(&self, collection: &str, filter: Filter) -> Subscription {
        self.feed.subscribe(collection, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{ReadStamp, WriteOp};
    use serde_json::json;

    fn create(collection: &str, id: Uuid, body: serde_json::Value) -> WriteOp {
        WriteOp { collection: collection.into(), id, kind: WriteKind::Create, body }
    }

    #[tokio::test]
    async fn stale_read_rejects_the_whole_batch() {
        let store = MemoryDocumentStore::new();
        let account = Uuid::new_v4();
        store
            .commit(WriteBatch { reads: vec![], writes: vec![create("accounts", account, json!({ "balance": "10" }))] })
            .await
            .unwrap();

        // Outro escopo atualiza a conta (versão 1 -> 2)
        store
            .commit(WriteBatch {
                reads: vec![],
                writes: vec![WriteOp {
                    collection: "accounts".into(),
                    id: account,
                    kind: WriteKind::Update { expected_version: 1 },
                    body: json!({ "balance": "5" }),
                }],
            })
            .await
            .unwrap();

        // Este escopo leu a versão 1 e tenta gravar uma movimentação
        let movement = Uuid::new_v4();
        let result = store
            .commit(WriteBatch {
                reads: vec![ReadStamp { collection: "accounts".into(), id: account, version: Some(1) }],
                writes: vec![create("movements", movement, json!({}))],
            })
            .await;

        assert!(matches!(result, Err(AppError::CommitConflict)));
        assert!(store.get("movements", movement).await.unwrap().is_none());
        assert_eq!(store.get("accounts", account).await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn create_fails_when_document_exists() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        let batch = WriteBatch { reads: vec![], writes: vec![create("products", id, json!({}))] };
        store.commit(batch.clone()).await.unwrap();

        assert!(matches!(store.commit(batch).await, Err(AppError::CommitConflict)));
    }

    #[tokio::test]
    async fn query_keeps_insertion_order() {
        let store = MemoryDocumentStore::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            let body = json!({ "kind": if i % 2 == 0 { "EVEN" } else { "ODD" } });
            store
                .commit(WriteBatch { reads: vec![], writes: vec![create("things", *id, body)] })
                .await
                .unwrap();
        }

        let even: Vec<Uuid> = store
            .query("things", &Filter::new().eq("kind", "EVEN"))
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        assert_eq!(even, vec![ids[0], ids[2], ids[4]]);
    }

    #[tokio::test]
    async fn committed_writes_reach_subscribers() {
        let store = MemoryDocumentStore::new();
        let mut sub = store.subscribe("products", Filter::new());
        let id = Uuid::new_v4();
        store
            .commit(WriteBatch { reads: vec![], writes: vec![create("products", id, json!({ "name": "Linguiça" }))] })
            .await
            .unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.body["name"], "Linguiça");
    }
}
