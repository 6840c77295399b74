// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::User, tenancy::Tenant},
};

// Nome do cookie HTTP-only da sessão
pub const SESSION_COOKIE: &str = "suporte-edu-token";

/// Usuário da sessão, relido do repositório a cada requisição.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub tenant: Option<Tenant>,
}

/// Credencial da requisição: `Authorization: Bearer` tem precedência sobre o cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub(crate) async fn authenticate_request(
    app_state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AppError> {
    let token = session_token(headers).ok_or(AppError::SessionInvalid)?;
    let (user, tenant) = app_state.auth_service.resolve_session(&token).await?;
    Ok(AuthenticatedUser { user, tenant })
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authenticated = authenticate_request(&app_state, request.headers())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(authenticated);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::SessionInvalid)
    }
}

// ---
// Cookie da sessão
// ---

fn base_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}

/// Valor do `Set-Cookie` do login.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    format!("{}; Max-Age={max_age_secs}", base_cookie(token.to_string(), secure))
}

/// Valor do `Set-Cookie` do logout: cookie vazio e expirado.
pub fn clear_session_cookie(secure: bool) -> String {
    format!("{}; Max-Age=0", base_cookie(String::new(), secure))
}
