// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// O erro de domínio único da aplicação. Os serviços só conhecem este tipo;
// a tradução para HTTP acontece na borda (handlers/middleware).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Campo obrigatório ausente: {0}")]
    MissingField(&'static str),

    #[error("Campo inválido: {field} ({reason})")]
    InvalidField { field: &'static str, reason: &'static str },

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Secretaria inativa ou inexistente")]
    TenantInactive,

    #[error("Sessão inválida ou expirada")]
    SessionInvalid,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Permissão negada: {0}")]
    Forbidden(&'static str),

    #[error("Contexto de secretaria obrigatório")]
    TenantContextRequired,

    #[error("Cabeçalho X-Tenant-ID inválido")]
    InvalidTenantHeader,

    #[error("Chamado concluído")]
    TicketClosed,

    #[error("Nota de fechamento obrigatória")]
    ClosingNoteRequired,

    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    #[error("Senha atual incorreta")]
    CurrentPasswordIncorrect,

    #[error("Confirmação de senha não confere")]
    PasswordConfirmationMismatch,

    #[error("Provedor de chat não configurado")]
    ProviderNotConfigured,

    #[error("Erro do provedor de chat: {0}")]
    Upstream(String),

    #[error("Erro de armazenamento: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Status HTTP e chave de mensagem de cada variante.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
            AppError::InvalidField { .. } => (StatusCode::BAD_REQUEST, "invalid_field"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::TenantInactive => (StatusCode::FORBIDDEN, "tenant_inactive"),
            AppError::SessionInvalid => (StatusCode::UNAUTHORIZED, "session_invalid"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::TenantContextRequired => (StatusCode::BAD_REQUEST, "tenant_context_required"),
            AppError::InvalidTenantHeader => (StatusCode::BAD_REQUEST, "tenant_header_invalid"),
            AppError::TicketClosed => (StatusCode::CONFLICT, "ticket_closed"),
            AppError::ClosingNoteRequired => (StatusCode::BAD_REQUEST, "closing_note_required"),
            AppError::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
            AppError::CurrentPasswordIncorrect => (StatusCode::BAD_REQUEST, "current_password"),
            AppError::PasswordConfirmationMismatch => (StatusCode::BAD_REQUEST, "password_confirmation"),
            AppError::ProviderNotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, "provider_not_configured"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream"),
            AppError::Storage(_)
            | AppError::Serialization(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::InternalServerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    /// Converte o erro de domínio na resposta da API, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        let (status, key) = self.classify();
        let message = i18n_store.translate(&locale.0, key).to_string();

        if status.is_server_error() && !matches!(self, AppError::ProviderNotConfigured) {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::MissingField(field) => Some(json!({ "field": field })),
            AppError::InvalidField { field, reason } => Some(json!({ "field": field, "reason": reason })),
            AppError::Forbidden(capability) => Some(json!({ "capability": capability })),
            // O texto do provedor é útil para o cliente do chat.
            AppError::Upstream(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError {
            status,
            error: message,
            details,
        }
    }
}

/// Resposta de erro já localizada.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado onde não há extrator de idioma disponível: responde no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_family_maps_to_expected_statuses() {
        assert_eq!(AppError::InvalidCredentials.classify().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::SessionInvalid.classify().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TenantInactive.classify().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::UserNotFound.classify().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.classify().0, StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_is_localized() {
        let store = I18nStore::new();
        let api = AppError::InvalidCredentials.to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.error, "Invalid email or password.");

        let api = AppError::InvalidCredentials.to_api_error(&Locale::default(), &store);
        assert_eq!(api.error, "Email ou senha incorretos.");
    }

    #[test]
    fn missing_field_carries_the_field_name() {
        let api = AppError::MissingField("email").to_api_error(&Locale::default(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details, Some(json!({ "field": "email" })));
    }
}
