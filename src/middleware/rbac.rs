// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::rbac::{can_access_slug, Capability},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn capability() -> Capability;

    fn slug() -> &'static str {
        Self::capability().slug()
    }
}

/// 2. O Extractor (Guardião)
///
/// Confere o nível do usuário da sessão (já relido do repositório pelo
/// `auth_guard`/`tenant_guard`), nunca um nível enviado pelo cliente.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::SessionInvalid.to_api_error(&locale, &app_state.i18n_store))?;

        if !can_access_slug(user.user.role, T::slug()) {
            tracing::debug!(user_id = %user.user.id, capability = T::slug(), "Permissão negada");
            return Err(AppError::Forbidden(T::slug()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermViewAdminConsole;
impl PermissionDef for PermViewAdminConsole {
    fn capability() -> Capability { Capability::ViewAdminConsole }
}

pub struct PermManageTenants;
impl PermissionDef for PermManageTenants {
    fn capability() -> Capability { Capability::ManageTenants }
}

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn capability() -> Capability { Capability::ManageUsers }
}

pub struct PermEditTicketStatus;
impl PermissionDef for PermEditTicketStatus {
    fn capability() -> Capability { Capability::EditOwnTicketStatus }
}

pub struct PermCloseTicket;
impl PermissionDef for PermCloseTicket {
    fn capability() -> Capability { Capability::CloseTicket }
}

pub struct PermPostBulletin;
impl PermissionDef for PermPostBulletin {
    fn capability() -> Capability { Capability::PostBulletin }
}

pub struct PermEditAnyProfile;
impl PermissionDef for PermEditAnyProfile {
    fn capability() -> Capability { Capability::EditAnyProfile }
}
