// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{
        ChangeFeed, DocumentStore, Filter, StoredDocument, Subscription, WriteBatch, WriteKind,
    },
};

// SQLSTATEs que significam "outra transação chegou antes"
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    feed: ChangeFeed,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, feed: ChangeFeed::default() }
    }
}

// Converte erros de concorrência do Postgres em CommitConflict.
fn map_commit_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::CommitConflict;
        }
        if let Some(code) = db_err.code() {
            if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED {
                return AppError::CommitConflict;
            }
        }
    }
    e.into()
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, i64, Value)>(
            "SELECT id, version, body FROM documents WHERE collection = $1 AND id = $2",
        )
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, version, body)| StoredDocument { id, version, body }))
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, i64, Value)>(
            r#"
            SELECT id, version, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
            .bind(collection)
            .bind(filter.as_json())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, version, body)| StoredDocument { id, version, body })
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava as linhas lidas (em ordem estável para evitar deadlock) e confere as versões.
        //    Qualquer retorno antecipado faz rollback no drop do `tx`.
        for stamp in &batch.reads {
            let current = sqlx::query_as::<_, (i64,)>(
                "SELECT version FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
            )
                .bind(&stamp.collection)
                .bind(stamp.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_commit_error)?
                .map(|(version,)| version);

            if current != stamp.version {
                return Err(AppError::CommitConflict);
            }
        }

        // 2. Aplica as gravações
        for op in &batch.writes {
            match op.kind {
                WriteKind::Create => {
                    sqlx::query(
                        "INSERT INTO documents (collection, id, version, body) VALUES ($1, $2, 1, $3)",
                    )
                        .bind(&op.collection)
                        .bind(op.id)
                        .bind(&op.body)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_commit_error)?;
                }
                WriteKind::Update { expected_version } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET body = $3, version = version + 1, updated_at = now()
                        WHERE collection = $1 AND id = $2 AND version = $4
                        "#,
                    )
                        .bind(&op.collection)
                        .bind(op.id)
                        .bind(&op.body)
                        .bind(expected_version)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_commit_error)?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::CommitConflict);
                    }
                }
            }
        }

        tx.commit().await.map_err(map_commit_error)?;

        self.feed.publish(&batch.writes);
        Ok(())
    }

    fn subscribe(&self, collection: &str, filter: Filter) -> Subscription {
        // Só vê commits feitos por esta instância do processo.
        self.feed.subscribe(collection, filter)
    }
}
