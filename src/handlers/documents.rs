// src/handlers/documents.rs

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
    middleware::i18n::Locale,
    models::{
        auth::Caller,
        documents::{CreateDocumentPayload, Document, DocumentSearchQuery},
    },
};

// GET /api/documents
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(
        DocumentSearchQuery,
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    responses(
        (status = 200, description = "Documentos do memorial, mais recentes primeiro", body = Vec<Document>)
    ),
    security(("api_jwt" = []))
)]
pub async fn search_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<DocumentSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .document_service
        .search(&caller, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(documents)))
}

// GET /api/documents/{id}
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    responses(
        (status = 200, description = "Documento", body = Document),
        (status = 404, description = "Documento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = app_state
        .document_service
        .get(&caller, document_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(document)))
}

// POST /api/documents
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Documento adicionado", body = Document),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let document = app_state
        .document_service
        .create(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(document)))
}

// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    responses(
        (status = 204, description = "Documento removido"),
        (status = 403, description = "Só o autor ou a equipe de suporte"),
        (status = 404, description = "Documento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento"),
        ("x-tenant-id" = Option<Uuid>, Header, description = "ID da secretaria (obrigatório para o superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .document_service
        .delete(&caller, document_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
