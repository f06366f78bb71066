// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Actor, Claims, PermissionSet},
};

/// Valida os tokens emitidos pelo provedor de identidade.
/// O núcleo não conhece usuários: só recebe o `Actor` e as flags de permissão.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejeitado");
            AppError::InvalidToken
        })?;

        Ok(token_data.claims)
    }

    /// Emite um token com as permissões informadas (provedor de identidade e testes).
    pub fn issue_token(&self, actor: &Actor, permissions: PermissionSet, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: actor.id,
            name: actor.display_name.clone(),
            permissions,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{Module, ModulePermissions};
    use uuid::Uuid;

    #[test]
    fn issued_token_round_trips_identity_and_flags() {
        let service = AuthService::new("segredo-de-teste".into());
        let actor = Actor::new(Uuid::new_v4(), "Maria");
        let mut permissions = PermissionSet::new();
        permissions.insert(Module::Sales, ModulePermissions { can_create: true, ..Default::default() });

        let token = service.issue_token(&actor, permissions, Duration::hours(1)).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, actor.id);
        assert_eq!(claims.name, "Maria");
        assert!(claims.permissions[&Module::Sales].can_create);
        assert!(!claims.permissions[&Module::Sales].can_inactivate);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = AuthService::new("outro".into());
        let service = AuthService::new("segredo".into());
        let actor = Actor::new(Uuid::new_v4(), "João");

        let token = issuer.issue_token(&actor, PermissionSet::new(), Duration::hours(1)).unwrap();

        assert!(matches!(service.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service.validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}
