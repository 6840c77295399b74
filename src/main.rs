//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod tests;

// Importações principais
use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, tenancy::tenant_guard};

/// Monta o router completo da aplicação.
pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas, exceto /me)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/signup", post(handlers::auth::signup))
        .route("/password-reset-request", post(handlers::auth::password_reset_request))
        .route("/logout", post(handlers::auth::logout))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::get_me))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", put(handlers::auth::update_me))
        .route("/me/capabilities", get(handlers::auth::my_capabilities))
        .route("/{id}/profile", put(handlers::auth::update_profile))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Painel administrativo: superadmin e admin atuam sobre todas as secretarias
    let admin_routes = Router::new()
        .route("/summary", get(handlers::admin::get_summary))
        .route("/tenants", get(handlers::admin::list_tenants))
        .route("/tenants/{id}/{action}", post(handlers::admin::transition_tenant))
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/{action}", post(handlers::admin::transition_user))
        .route("/users/{id}/role", put(handlers::admin::change_role))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Proxy do provedor de chat: só autenticação, sem secretaria
    let completion_routes = Router::new()
        .route("/api/chat", post(handlers::chat::completion))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Tudo que pertence a uma secretaria: Auth + Tenancy
    let tenant_routes = Router::new()
        .route(
            "/api/tickets",
            get(handlers::tickets::list_tickets).post(handlers::tickets::open_ticket),
        )
        .route("/api/tickets/{id}", get(handlers::tickets::get_ticket))
        .route("/api/tickets/{id}/replies", post(handlers::tickets::reply_ticket))
        .route("/api/tickets/{id}/start", post(handlers::tickets::start_ticket))
        .route("/api/tickets/{id}/close", post(handlers::tickets::close_ticket))
        .route(
            "/api/calendar/events",
            get(handlers::calendar::list_events).post(handlers::calendar::create_event),
        )
        .route("/api/calendar/events/upcoming", get(handlers::calendar::upcoming_events))
        .route(
            "/api/calendar/events/{id}",
            axum::routing::delete(handlers::calendar::delete_event),
        )
        .route(
            "/api/calendar/bulletins",
            get(handlers::calendar::list_bulletins).post(handlers::calendar::create_bulletin),
        )
        .route(
            "/api/calendar/bulletins/{id}",
            axum::routing::delete(handlers::calendar::delete_bulletin),
        )
        .route(
            "/api/documents",
            get(handlers::documents::search_documents).post(handlers::documents::create_document),
        )
        .route(
            "/api/documents/{id}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route(
            "/api/chats",
            get(handlers::chat::list_chats)
                .post(handlers::chat::create_chat)
                .delete(handlers::chat::delete_all_chats),
        )
        .route(
            "/api/chats/active",
            get(handlers::chat::get_active_chat).put(handlers::chat::set_active_chat),
        )
        .route(
            "/api/chats/{id}",
            get(handlers::chat::get_chat).delete(handlers::chat::delete_chat),
        )
        .route("/api/chats/{id}/messages", post(handlers::chat::send_message))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .merge(completion_routes)
        .merge(tenant_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr.clone();

    let app_state = AppState::new(settings)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {bind_addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state))
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
