// src/handlers/calendar.rs

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
        rbac::{PermPostBulletin, RequirePermission},
    },
    models::{
        auth::Caller,
        calendar::{Bulletin, CreateBulletinPayload, CreateEventPayload, Event, EventListQuery},
    },
};

// =============================================================================
//  ÁREA 1: EVENTOS
// =============================================================================

// GET /api/calendar/events
#[utoipa::path(
    get,
    path = "/api/calendar/events",
    tag = "Calendar",
    params(
        EventListQuery,
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Eventos oficiais e pessoais visíveis, por início", body = Vec<Event>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .calendar_service
        .list_events(&caller, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(events)))
}

// GET /api/calendar/events/upcoming
#[utoipa::path(
    get,
    path = "/api/calendar/events/upcoming",
    tag = "Calendar",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Eventos de amanhã", body = Vec<Event>)
    ),
    security(("api_jwt" = []))
)]
pub async fn upcoming_events(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .calendar_service
        .upcoming(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(events)))
}

// POST /api/calendar/events
#[utoipa::path(
    post,
    path = "/api/calendar/events",
    tag = "Calendar",
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Evento criado; eventos oficiais também vão para o mural", body = Event),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<CreateEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .calendar_service
        .create_event(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(event)))
}

// DELETE /api/calendar/events/{id}
#[utoipa::path(
    delete,
    path = "/api/calendar/events/{id}",
    tag = "Calendar",
    responses(
        (status = 204, description = "Evento e aviso espelhado removidos"),
        (status = 403, description = "Só o autor ou quem publica no mural"),
        (status = 404, description = "Evento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do evento"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_event(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .calendar_service
        .delete_event(&caller, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: MURAL DE AVISOS
// =============================================================================

// GET /api/calendar/bulletins
#[utoipa::path(
    get,
    path = "/api/calendar/bulletins",
    tag = "Calendar",
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Avisos, data mais recente primeiro", body = Vec<Bulletin>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bulletins(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let bulletins = app_state
        .calendar_service
        .list_bulletins(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bulletins)))
}

// POST /api/calendar/bulletins
#[utoipa::path(
    post,
    path = "/api/calendar/bulletins",
    tag = "Calendar",
    request_body = CreateBulletinPayload,
    responses(
        (status = 201, description = "Aviso publicado", body = Bulletin),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Requer post-bulletin")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bulletin(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPostBulletin>,
    caller: Caller,
    Json(payload): Json<CreateBulletinPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let bulletin = app_state
        .calendar_service
        .create_bulletin(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(bulletin)))
}

// DELETE /api/calendar/bulletins/{id}
#[utoipa::path(
    delete,
    path = "/api/calendar/bulletins/{id}",
    tag = "Calendar",
    responses(
        (status = 204, description = "Aviso removido"),
        (status = 403, description = "Requer post-bulletin"),
        (status = 404, description = "Aviso não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do aviso"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bulletin(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPostBulletin>,
    caller: Caller,
    Path(bulletin_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .calendar_service
        .delete_bulletin(&caller, bulletin_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
