// src/models/auth.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Quem executou a ação. Vai para toda movimentação de estoque/banco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: Uuid,
    pub display_name: String,
}

impl Actor {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self { id, display_name: display_name.into() }
    }
}

// Módulos do sistema, cada um com suas próprias flags de permissão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Module {
    Inventory,
    Purchases,
    Sales,
    Production,
    Finance,
    Crm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Create,
    Edit,
    Inactivate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePermissions {
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_inactivate: bool,
}

impl ModulePermissions {
    pub fn all() -> Self {
        Self { can_create: true, can_edit: true, can_inactivate: true }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Create => self.can_create,
            Capability::Edit => self.can_edit,
            Capability::Inactivate => self.can_inactivate,
        }
    }
}

pub type PermissionSet = HashMap<Module, ModulePermissions>;

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de identidade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionSet,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
