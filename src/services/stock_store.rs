// src/services/stock_store.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::checked_add},
    db::transaction::Transaction,
    models::{
        auth::Actor,
        inventory::{Product, StockDirection, StockMovement, StockReason},
        status::RecordStatus,
    },
};

/// Dados de uma movimentação de estoque a registrar.
#[derive(Debug, Clone)]
pub struct StockChange<'a> {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub direction: StockDirection,
    pub reason: StockReason,
    pub notes: Option<String>,
    pub reference_id: Option<Uuid>,
    pub actor: &'a Actor,
}

/// Única porta de alteração da quantidade de um produto.
/// Cada chamada grava a StockMovement e atualiza o cache do produto no mesmo escopo.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockStore;

impl StockStore {
    /// Garante que há estoque para `requested`. Usado antes de gravar qualquer coisa
    /// quando o mesmo produto aparece em mais de uma linha.
    pub fn ensure_available(product: &Product, requested: Decimal) -> Result<(), AppError> {
        if product.quantity < requested {
            return Err(AppError::InsufficientStock {
                product_id: product.id,
                product_name: product.name.clone(),
                available: product.quantity,
                requested,
            });
        }
        Ok(())
    }

    pub async fn record_movement(
        &self,
        tx: &mut Transaction<'_>,
        change: StockChange<'_>,
    ) -> Result<StockMovement, AppError> {
        if change.quantity <= Decimal::ZERO {
            return Err(AppError::validation("A quantidade movimentada deve ser maior que zero"));
        }

        let mut product: Product = tx.require(change.product_id).await?;

        if product.status != RecordStatus::Active {
            return Err(AppError::validation(format!(
                "Produto '{}' está inativo e não aceita movimentações",
                product.name
            )));
        }
        if change.direction == StockDirection::Exit {
            Self::ensure_available(&product, change.quantity)?;
        }

        let now = Utc::now();
        let signed = change.direction.signed(change.quantity);

        product.quantity = checked_add(product.quantity, signed)?;
        product.updated_at = now;

        let movement = StockMovement {
            id: Uuid::new_v4(),
            product_id: product.id,
            quantity: signed,
            direction: change.direction,
            reason: change.reason,
            notes: change.notes,
            reference_id: change.reference_id,
            actor_id: change.actor.id,
            actor_name: change.actor.display_name.clone(),
            created_at: now,
        };

        tx.update(&product)?;
        tx.insert(&movement)?;

        tracing::debug!(
            product_id = %product.id,
            quantity = %signed,
            reason = ?change.reason,
            "Movimentação de estoque enfileirada"
        );

        Ok(movement)
    }

    /// Quantidade reconstruída a partir do histórico de movimentações.
    pub fn replay(movements: &[StockMovement]) -> Decimal {
        movements.iter().map(|m| m.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{memory_store::MemoryDocumentStore, store::DocumentStore},
        models::inventory::ProductKind,
    };
    use rust_decimal_macros::dec;

    fn product(quantity: Decimal, status: RecordStatus) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Picanha".into(),
            sku: None,
            kind: ProductKind::ForSale,
            unit: "kg".into(),
            quantity,
            unit_cost: dec!(40),
            sale_price: Some(dec!(69.9)),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed(store: &MemoryDocumentStore, p: &Product) {
        let mut tx = Transaction::new(store);
        tx.insert(p).unwrap();
        tx.commit().await.unwrap();
    }

    fn change(product_id: Uuid, quantity: Decimal, direction: StockDirection, actor: &Actor) -> StockChange<'_> {
        StockChange {
            product_id,
            quantity,
            direction,
            reason: StockReason::Adjustment,
            notes: None,
            reference_id: None,
            actor,
        }
    }

    #[tokio::test]
    async fn exit_updates_cache_and_writes_signed_movement() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Operador");
        let p = product(dec!(10), RecordStatus::Active);
        seed(&store, &p).await;

        let mut tx = Transaction::new(&store);
        let movement = StockStore
            .record_movement(&mut tx, change(p.id, dec!(4), StockDirection::Exit, &actor))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(movement.quantity, dec!(-4));
        assert_eq!(movement.actor_name, "Operador");
        let stored: Product = store.get("products", p.id).await.unwrap().unwrap().decode().unwrap();
        assert_eq!(stored.quantity, dec!(6));
    }

    #[tokio::test]
    async fn exit_beyond_stock_is_rejected() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Operador");
        let p = product(dec!(5), RecordStatus::Active);
        seed(&store, &p).await;

        let mut tx = Transaction::new(&store);
        let result = StockStore
            .record_movement(&mut tx, change(p.id, dec!(10), StockDirection::Exit, &actor))
            .await;

        match result {
            Err(AppError::InsufficientStock { product_name, available, requested, .. }) => {
                assert_eq!(product_name, "Picanha");
                assert_eq!(available, dec!(5));
                assert_eq!(requested, dec!(10));
            }
            other => panic!("esperado InsufficientStock, veio {:?}", other.map(|m| m.id)),
        }
        assert_eq!(tx.pending_writes(), 0);
    }

    #[tokio::test]
    async fn inactive_product_and_zero_quantity_are_rejected() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Operador");
        let inactive = product(dec!(5), RecordStatus::Inactive);
        let active = product(dec!(5), RecordStatus::Active);
        seed(&store, &inactive).await;
        seed(&store, &active).await;

        let mut tx = Transaction::new(&store);
        let r1 = StockStore
            .record_movement(&mut tx, change(inactive.id, dec!(1), StockDirection::Entry, &actor))
            .await;
        let r2 = StockStore
            .record_movement(&mut tx, change(active.id, Decimal::ZERO, StockDirection::Entry, &actor))
            .await;

        assert!(matches!(r1, Err(AppError::ValidationFailed(_))));
        assert!(matches!(r2, Err(AppError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn replay_sums_signed_quantities() {
        let store = MemoryDocumentStore::new();
        let actor = Actor::new(Uuid::new_v4(), "Operador");
        let p = product(Decimal::ZERO, RecordStatus::Active);
        seed(&store, &p).await;

        let mut tx = Transaction::new(&store);
        let a = StockStore
            .record_movement(&mut tx, change(p.id, dec!(7), StockDirection::Entry, &actor))
            .await
            .unwrap();
        let b = StockStore
            .record_movement(&mut tx, change(p.id, dec!(2.5), StockDirection::Exit, &actor))
            .await
            .unwrap();

        assert_eq!(StockStore::replay(&[a, b]), dec!(4.5));
        let cached: Product = tx.require(p.id).await.unwrap();
        assert_eq!(cached.quantity, dec!(4.5));
    }
}
