// src/handlers/chat.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::Caller,
        chat::{Chat, CompletionPayload, CompletionResponse, SendMessagePayload, SetActiveChatPayload},
    },
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChatResponse {
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatsRemovedResponse {
    pub removed: usize,
}

// =============================================================================
//  ÁREA 1: PROXY DO PROVEDOR
// =============================================================================

// POST /api/chat
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = CompletionPayload,
    responses(
        (status = 200, description = "Resposta do provedor", body = CompletionResponse),
        (status = 400, description = "Mensagens ausentes ou malformadas"),
        (status = 500, description = "OPENAI_API_KEY não configurada"),
        (status = 502, description = "Falha do provedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn completion(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Corpo que não é JSON segue adiante como nulo: a chave do provedor é conferida antes.
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let ai_response = app_state
        .chat_service
        .proxy(body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(CompletionResponse { ai_response })))
}

// =============================================================================
//  ÁREA 2: CONVERSAS
// =============================================================================

// GET /api/chats
#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "Chat",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Conversas do usuário, mais recentes primeiro", body = Vec<Chat>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_chats(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let chats = app_state
        .chat_service
        .list(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chats)))
}

// POST /api/chats
#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "Chat",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 201, description = "Conversa criada com a mensagem de boas-vindas", body = Chat)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_chat(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let chat = app_state
        .chat_service
        .create(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(chat)))
}

// DELETE /api/chats
#[utoipa::path(
    delete,
    path = "/api/chats",
    tag = "Chat",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Todas as conversas do usuário apagadas", body = ChatsRemovedResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_all_chats(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let removed = app_state
        .chat_service
        .delete_all(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ChatsRemovedResponse { removed })))
}

// GET /api/chats/{id}
#[utoipa::path(
    get,
    path = "/api/chats/{id}",
    tag = "Chat",
    responses(
        (status = 200, description = "Conversa", body = Chat),
        (status = 404, description = "Conversa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conversa"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_chat(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = app_state
        .chat_service
        .get(&caller, chat_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chat)))
}

// DELETE /api/chats/{id}
#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    tag = "Chat",
    responses(
        (status = 204, description = "Conversa apagada"),
        (status = 404, description = "Conversa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conversa"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_chat(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .chat_service
        .delete(&caller, chat_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/chats/{id}/messages
#[utoipa::path(
    post,
    path = "/api/chats/{id}/messages",
    tag = "Chat",
    request_body = SendMessagePayload,
    responses(
        (status = 200, description = "Conversa com a mensagem e a resposta do assistente", body = Chat),
        (status = 400, description = "Mensagem vazia"),
        (status = 404, description = "Conversa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conversa"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = app_state
        .chat_service
        .send_message(&caller, chat_id, &payload.content)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chat)))
}

// =============================================================================
//  ÁREA 3: CONVERSA ATIVA
// =============================================================================

// GET /api/chats/active
#[utoipa::path(
    get,
    path = "/api/chats/active",
    tag = "Chat",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Última conversa aberta, se ainda existir", body = ActiveChatResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_active_chat(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let chat_id = app_state
        .chat_service
        .active_id(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ActiveChatResponse { chat_id })))
}

// PUT /api/chats/active
#[utoipa::path(
    put,
    path = "/api/chats/active",
    tag = "Chat",
    request_body = SetActiveChatPayload,
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Conversa ativa atualizada", body = ActiveChatResponse),
        (status = 404, description = "Conversa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_active_chat(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<SetActiveChatPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .chat_service
        .set_active(&caller, payload.chat_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(ActiveChatResponse {
            chat_id: Some(payload.chat_id),
        }),
    ))
}
