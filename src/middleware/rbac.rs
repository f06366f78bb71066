// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{Capability, Module},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const MODULE: Module;
    const CAPABILITY: Capability;

    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião). A checagem é só de apresentação: o núcleo não sabe de permissões.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.can(T::MODULE, T::CAPABILITY) {
            tracing::warn!(actor_id = %user.actor.id, permission = T::slug(), "⛔ Permissão negada");
            return Err(AppError::Forbidden(T::slug().to_string()));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $module:ident, $capability:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            const MODULE: Module = Module::$module;
            const CAPABILITY: Capability = Capability::$capability;

            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permission!(PermInventoryCreate, Inventory, Create, "inventory:create");
permission!(PermInventoryEdit, Inventory, Edit, "inventory:edit");
permission!(PermInventoryInactivate, Inventory, Inactivate, "inventory:inactivate");

permission!(PermPurchasesCreate, Purchases, Create, "purchases:create");
permission!(PermPurchasesInactivate, Purchases, Inactivate, "purchases:inactivate");

permission!(PermSalesCreate, Sales, Create, "sales:create");
permission!(PermSalesInactivate, Sales, Inactivate, "sales:inactivate");

permission!(PermProductionCreate, Production, Create, "production:create");
permission!(PermProductionInactivate, Production, Inactivate, "production:inactivate");

permission!(PermFinanceCreate, Finance, Create, "finance:create");
permission!(PermFinanceEdit, Finance, Edit, "finance:edit");
permission!(PermFinanceInactivate, Finance, Inactivate, "finance:inactivate");

permission!(PermCrmCreate, Crm, Create, "crm:create");
permission!(PermCrmInactivate, Crm, Inactivate, "crm:inactivate");
