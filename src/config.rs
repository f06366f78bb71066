// src/config.rs

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::{env, str::FromStr, sync::Arc, time::Duration};

use crate::{
    db::{
        CrmRepository, DocumentStore, FinanceRepository, InventoryRepository, MemoryDocumentStore,
        OperationsRepository, PgDocumentStore,
    },
    services::{
        auth::AuthService, coordinator::TransactionCoordinator, crm_service::CrmService,
        finance_service::FinanceService, inventory_service::InventoryService,
        production_service::ProductionService, purchase_service::PurchaseService, sale_service::SaleService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem `DATABASE_URL` o servidor sobe com o armazenamento em memória.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub max_commit_attempts: u32,
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} inválido: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            max_commit_attempts: env_or("MAX_COMMIT_ATTEMPTS", 5)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub finance_service: FinanceService,
    pub purchase_service: PurchaseService,
    pub sale_service: SaleService,
    pub production_service: ProductionService,
    pub crm_service: CrmService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgDocumentStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando armazenamento em memória (dados não persistem)");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(store, config.jwt_secret.clone(), config.max_commit_attempts))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn DocumentStore>, jwt_secret: String, max_commit_attempts: u32) -> Self {
        let coordinator = TransactionCoordinator::new(store.clone(), max_commit_attempts);

        let inventory_repo = InventoryRepository::new(store.clone());
        let finance_repo = FinanceRepository::new(store.clone());
        let operations_repo = OperationsRepository::new(store.clone());
        let crm_repo = CrmRepository::new(store);

        Self {
            auth_service: AuthService::new(jwt_secret),
            inventory_service: InventoryService::new(coordinator.clone(), inventory_repo),
            finance_service: FinanceService::new(coordinator.clone(), finance_repo),
            purchase_service: PurchaseService::new(coordinator.clone(), operations_repo.clone()),
            sale_service: SaleService::new(coordinator.clone(), operations_repo.clone()),
            production_service: ProductionService::new(coordinator.clone(), operations_repo),
            crm_service: CrmService::new(coordinator, crm_repo),
        }
    }
}
