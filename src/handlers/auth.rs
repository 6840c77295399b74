// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{clear_session_cookie, session_cookie, AuthenticatedUser},
        i18n::Locale,
        rbac::{PermEditAnyProfile, RequirePermission},
    },
    models::{
        auth::{
            LoginResponse, LoginUserPayload, MeResponse, PasswordResetPayload, PublicUser,
            SignupPayload, SuccessResponse, UpdateProfilePayload,
        },
        rbac::CapabilityList,
    },
};

// =============================================================================
//  ÁREA 1: SESSÃO
// =============================================================================

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado; o token também vai no cookie HTTP-only", body = LoginResponse),
        (status = 400, description = "Email ou senha ausentes"),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Secretaria inativa")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cookie = session_cookie(
        &session.token,
        app_state.settings.session_ttl().num_seconds(),
        app_state.settings.cookie_secure,
    );

    let response = LoginResponse {
        user: PublicUser::from(&session.user),
        tenant: session.tenant,
        token: session.token,
        expires_at: session.expires_at,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário e secretaria da sessão", body = MeResponse),
        (status = 401, description = "Token ausente, inválido ou expirado"),
        (status = 403, description = "Secretaria inativa"),
        (status = 404, description = "Usuário desativado após o login")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(auth: AuthenticatedUser) -> Result<impl IntoResponse, ApiError> {
    Ok((
        StatusCode::OK,
        Json(MeResponse {
            user: PublicUser::from(&auth.user),
            tenant: auth.tenant,
        }),
    ))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Cookie da sessão removido", body = SuccessResponse)
    )
)]
pub async fn logout(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(app_state.settings.cookie_secure))],
        Json(SuccessResponse {
            success: true,
            message: "Sessão encerrada.".to_string(),
        }),
    )
}

// =============================================================================
//  ÁREA 2: CADASTRO E RECUPERAÇÃO DE SENHA
// =============================================================================

// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 200, description = "Cadastro recebido, aguardando aprovação", body = SuccessResponse),
        (status = 400, description = "Campo obrigatório ausente ou inválido"),
        (status = 409, description = "Email já cadastrado")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .signup(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Cadastro realizado com sucesso! Aguarde a aprovação do administrador."
                .to_string(),
        }),
    ))
}

// POST /api/auth/password-reset-request
#[utoipa::path(
    post,
    path = "/api/auth/password-reset-request",
    tag = "Auth",
    request_body = PasswordResetPayload,
    responses(
        (status = 200, description = "Sempre responde com sucesso", body = SuccessResponse),
        (status = 400, description = "Email ausente")
    )
)]
pub async fn password_reset_request(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PasswordResetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .request_password_reset(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Se o email estiver cadastrado, você receberá as instruções de recuperação."
                .to_string(),
        }),
    ))
}

// =============================================================================
//  ÁREA 3: PERFIL
// =============================================================================

// PUT /api/users/me
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = PublicUser),
        (status = 400, description = "Dados inválidos ou senha atual incorreta"),
        (status = 409, description = "Email já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    locale: Locale,
    auth: AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .auth_service
        .update_profile(&auth.user, auth.user.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(PublicUser::from(user))))
}

// PUT /api/users/{id}/profile
#[utoipa::path(
    put,
    path = "/api/users/{id}/profile",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = PublicUser),
        (status = 403, description = "Requer edit-any-profile"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermEditAnyProfile>,
    auth: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .auth_service
        .update_profile(&auth.user, user_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(PublicUser::from(user))))
}

// GET /api/users/me/capabilities
#[utoipa::path(
    get,
    path = "/api/users/me/capabilities",
    tag = "Users",
    responses(
        (status = 200, description = "Capacidades do nível do usuário", body = CapabilityList)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_capabilities(auth: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(CapabilityList::for_role(auth.user.role))))
}
