// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{authenticate_request, AuthenticatedUser},
        i18n::Locale,
    },
    models::{auth::Caller, rbac::Role},
};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

fn requested_tenant(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    match headers.get(TENANT_ID_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(Some)
            .ok_or(AppError::InvalidTenantHeader),
    }
}

/// A secretaria vem da sessão. O superadmin (sem secretaria) precisa nomeá-la
/// no cabeçalho; os demais não podem apontar para outra.
async fn resolve_tenant_context(
    app_state: &AppState,
    authenticated: &AuthenticatedUser,
    headers: &HeaderMap,
) -> Result<Uuid, AppError> {
    let requested = requested_tenant(headers)?;

    if authenticated.user.role == Role::Superadmin {
        let other = requested.ok_or(AppError::TenantContextRequired)?;
        return app_state
            .auth_service
            .find_tenant(other)
            .await?
            .map(|tenant| tenant.id)
            .ok_or(AppError::NotFound("secretaria"));
    }

    let own = authenticated.user.tenant_id.ok_or(AppError::TenantInactive)?;
    match requested {
        None => Ok(own),
        Some(other) if other == own => Ok(own),
        Some(_) => Err(AppError::Forbidden("tenant-scope")),
    }
}

// Auth + Tenancy
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let authenticated = authenticate_request(&app_state, request.headers())
        .await
        .map_err(to_api)?;
    let tenant_id = resolve_tenant_context(&app_state, &authenticated, request.headers())
        .await
        .map_err(to_api)?;

    let caller = Caller {
        user_id: authenticated.user.id,
        role: authenticated.user.role,
        tenant_id,
    };
    tracing::debug!(user_id = %caller.user_id, tenant_id = %tenant_id, "Contexto de secretaria resolvido");

    let extensions = request.extensions_mut();
    extensions.insert(authenticated);
    extensions.insert(caller);

    Ok(next.run(request).await)
}

// Quem age e em qual secretaria, para os handlers
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or(AppError::TenantContextRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_is_optional_but_must_be_a_uuid() {
        let mut headers = HeaderMap::new();
        assert_eq!(requested_tenant(&headers).unwrap(), None);

        let id = Uuid::new_v4();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(requested_tenant(&headers).unwrap(), Some(id));

        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("loja-1"));
        assert!(matches!(requested_tenant(&headers), Err(AppError::InvalidTenantHeader)));
    }
}
