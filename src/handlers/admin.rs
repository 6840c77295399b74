// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermManageTenants, PermManageUsers, PermViewAdminConsole, RequirePermission},
    },
    models::{
        auth::{PublicUser, SuccessResponse},
        lifecycle::{ConsoleSummary, LifecycleAction, StatusQuery},
        rbac::ChangeRolePayload,
        tenancy::Tenant,
    },
    services::lifecycle_service::Transitioned,
};

// Rejeição apaga o registro: responde com uma confirmação em vez do registro.
fn transition_response<T: Serialize>(outcome: Transitioned<T>) -> Response {
    match outcome {
        Transitioned::Updated(record) => (StatusCode::OK, Json(record)).into_response(),
        Transitioned::Removed(id) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success: true,
                message: format!("Registro {id} rejeitado e removido."),
            }),
        )
            .into_response(),
    }
}

// GET /api/admin/summary
#[utoipa::path(
    get,
    path = "/api/admin/summary",
    tag = "Admin",
    responses(
        (status = 200, description = "Contagem de secretarias e usuários por estado", body = ConsoleSummary),
        (status = 403, description = "Requer view-admin-console")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermViewAdminConsole>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .lifecycle_service
        .summary(&auth.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// =============================================================================
//  SECRETARIAS
// =============================================================================

// GET /api/admin/tenants
#[utoipa::path(
    get,
    path = "/api/admin/tenants",
    tag = "Admin",
    params(StatusQuery),
    responses(
        (status = 200, description = "Secretarias, mais recentes primeiro", body = Vec<Tenant>),
        (status = 403, description = "Requer manage-tenants")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermManageTenants>,
    auth: AuthenticatedUser,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tenants = app_state
        .lifecycle_service
        .list_tenants(&auth.user, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenants)))
}

// POST /api/admin/tenants/{id}/{action}
#[utoipa::path(
    post,
    path = "/api/admin/tenants/{id}/{action}",
    tag = "Admin",
    responses(
        (status = 200, description = "Secretaria atualizada (ou removida, na rejeição)", body = Tenant),
        (status = 403, description = "Requer manage-tenants"),
        (status = 404, description = "Secretaria inexistente ou pedido já resolvido"),
        (status = 409, description = "Transição não permitida")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da secretaria"),
        ("action" = LifecycleAction, Path, description = "approve | reject | deactivate | reactivate")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermManageTenants>,
    auth: AuthenticatedUser,
    Path((tenant_id, action)): Path<(Uuid, LifecycleAction)>,
) -> Result<Response, ApiError> {
    let outcome = app_state
        .lifecycle_service
        .transition_tenant(&auth.user, tenant_id, action)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(transition_response(outcome))
}

// =============================================================================
//  USUÁRIOS
// =============================================================================

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(StatusQuery),
    responses(
        (status = 200, description = "Usuários, mais recentes primeiro", body = Vec<PublicUser>),
        (status = 403, description = "Requer manage-users")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermManageUsers>,
    auth: AuthenticatedUser,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users: Vec<PublicUser> = app_state
        .lifecycle_service
        .list_users(&auth.user, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/admin/users/{id}/{action}
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/{action}",
    tag = "Admin",
    responses(
        (status = 200, description = "Usuário atualizado (ou removido, na rejeição)", body = PublicUser),
        (status = 403, description = "Requer manage-users; não vale para a própria conta nem para níveis acima"),
        (status = 404, description = "Usuário inexistente ou pedido já resolvido"),
        (status = 409, description = "Transição não permitida")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("action" = LifecycleAction, Path, description = "approve | reject | deactivate | reactivate")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermManageUsers>,
    auth: AuthenticatedUser,
    Path((user_id, action)): Path<(Uuid, LifecycleAction)>,
) -> Result<Response, ApiError> {
    let outcome = app_state
        .lifecycle_service
        .transition_user(&auth.user, user_id, action)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = match outcome {
        Transitioned::Updated(user) => Transitioned::Updated(PublicUser::from(user)),
        Transitioned::Removed(id) => Transitioned::Removed(id),
    };
    Ok(transition_response(outcome))
}

// PUT /api/admin/users/{id}/role
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    tag = "Admin",
    request_body = ChangeRolePayload,
    responses(
        (status = 200, description = "Nível alterado", body = PublicUser),
        (status = 400, description = "Nível exige secretaria"),
        (status = 403, description = "Nível acima do próprio ou usuário acima de si"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_role(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermManageUsers>,
    auth: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .lifecycle_service
        .change_user_role(&auth.user, user_id, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(PublicUser::from(user))))
}
