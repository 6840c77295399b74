// src/handlers/tickets.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermCloseTicket, PermEditTicketStatus, RequirePermission},
    },
    models::{
        auth::Caller,
        tickets::{CloseTicketPayload, OpenTicketPayload, ReplyPayload, Ticket, TicketListQuery},
    },
};

// GET /api/tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    params(
        TicketListQuery,
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Chamados da secretaria, atualizados mais recentemente primeiro", body = Vec<Ticket>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<TicketListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = app_state
        .ticket_service
        .list(&caller, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tickets)))
}

// POST /api/tickets
#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    request_body = OpenTicketPayload,
    responses(
        (status = 201, description = "Chamado aberto", body = Ticket),
        (status = 400, description = "Título ou descrição ausentes")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<OpenTicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .open(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/tickets/{id}
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    responses(
        (status = 200, description = "Chamado com as respostas", body = Ticket),
        (status = 404, description = "Chamado não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .get(&caller, ticket_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

// POST /api/tickets/{id}/replies
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/replies",
    tag = "Tickets",
    request_body = ReplyPayload,
    responses(
        (status = 200, description = "Resposta adicionada; a primeira resposta da equipe inicia o atendimento", body = Ticket),
        (status = 400, description = "Resposta vazia"),
        (status = 404, description = "Chamado não encontrado"),
        (status = 409, description = "Chamado concluído")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn reply_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<ReplyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .reply(&caller, ticket_id, &payload.text)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

// POST /api/tickets/{id}/start
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/start",
    tag = "Tickets",
    responses(
        (status = 200, description = "Chamado em atendimento", body = Ticket),
        (status = 403, description = "Requer edit-own-ticket-status"),
        (status = 409, description = "Chamado concluído")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermEditTicketStatus>,
    caller: Caller,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .start_attendance(&caller, ticket_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}

// POST /api/tickets/{id}/close
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/close",
    tag = "Tickets",
    request_body = CloseTicketPayload,
    responses(
        (status = 200, description = "Chamado concluído", body = Ticket),
        (status = 400, description = "Nota de fechamento ausente"),
        (status = 403, description = "Requer close-ticket"),
        (status = 409, description = "Chamado já concluído")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCloseTicket>,
    caller: Caller,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<CloseTicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = app_state
        .ticket_service
        .close(&caller, ticket_id, &payload.closing_note)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ticket)))
}
