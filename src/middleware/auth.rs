// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Actor, Capability, Module, PermissionSet},
};

/// Identidade + flags de permissão do chamador, vindas do token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub actor: Actor,
    pub permissions: PermissionSet,
}

impl AuthenticatedUser {
    pub fn can(&self, module: Module, capability: Capability) -> bool {
        self.permissions
            .get(&module)
            .is_some_and(|flags| flags.allows(capability))
    }
}

// O middleware em si: valida o Bearer e deixa o usuário nos "extensions"
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;
    let claims = app_state.auth_service.validate_token(bearer.token())?;

    let user = AuthenticatedUser {
        actor: Actor::new(claims.sub, claims.name),
        permissions: claims.permissions,
    };
    tracing::debug!(actor_id = %user.actor.id, "Requisição autenticada");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::ModulePermissions;
    use uuid::Uuid;

    #[test]
    fn missing_module_grants_nothing() {
        let mut permissions = PermissionSet::new();
        permissions.insert(Module::Finance, ModulePermissions { can_edit: true, ..Default::default() });
        let user = AuthenticatedUser { actor: Actor::new(Uuid::new_v4(), "Ana"), permissions };

        assert!(user.can(Module::Finance, Capability::Edit));
        assert!(!user.can(Module::Finance, Capability::Create));
        assert!(!user.can(Module::Sales, Capability::Edit));
    }
}
