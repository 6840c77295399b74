// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::logout,
        handlers::auth::signup,
        handlers::auth::password_reset_request,

        // --- Users ---
        handlers::auth::update_me,
        handlers::auth::update_profile,
        handlers::auth::my_capabilities,

        // --- Admin ---
        handlers::admin::get_summary,
        handlers::admin::list_tenants,
        handlers::admin::transition_tenant,
        handlers::admin::list_users,
        handlers::admin::transition_user,
        handlers::admin::change_role,

        // --- Tickets ---
        handlers::tickets::list_tickets,
        handlers::tickets::open_ticket,
        handlers::tickets::get_ticket,
        handlers::tickets::reply_ticket,
        handlers::tickets::start_ticket,
        handlers::tickets::close_ticket,

        // --- Calendar ---
        handlers::calendar::list_events,
        handlers::calendar::upcoming_events,
        handlers::calendar::create_event,
        handlers::calendar::delete_event,
        handlers::calendar::list_bulletins,
        handlers::calendar::create_bulletin,
        handlers::calendar::delete_bulletin,

        // --- Documents ---
        handlers::documents::search_documents,
        handlers::documents::get_document,
        handlers::documents::create_document,
        handlers::documents::delete_document,

        // --- Chat ---
        handlers::chat::completion,
        handlers::chat::list_chats,
        handlers::chat::create_chat,
        handlers::chat::delete_all_chats,
        handlers::chat::get_chat,
        handlers::chat::delete_chat,
        handlers::chat::send_message,
        handlers::chat::get_active_chat,
        handlers::chat::set_active_chat,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::PublicUser,
            models::auth::LoginUserPayload,
            models::auth::LoginResponse,
            models::auth::MeResponse,
            models::auth::SignupPayload,
            models::auth::PasswordResetPayload,
            models::auth::UpdateProfilePayload,
            models::auth::SuccessResponse,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::Capability,
            models::rbac::CapabilityList,
            models::rbac::ChangeRolePayload,

            // --- Lifecycle / Tenancy ---
            models::lifecycle::AccountStatus,
            models::lifecycle::LifecycleAction,
            models::lifecycle::StatusCounts,
            models::lifecycle::ConsoleSummary,
            models::tenancy::Tenant,

            // --- Tickets ---
            models::tickets::TicketStatus,
            models::tickets::TicketFilter,
            models::tickets::Reply,
            models::tickets::Ticket,
            models::tickets::OpenTicketPayload,
            models::tickets::ReplyPayload,
            models::tickets::CloseTicketPayload,

            // --- Calendar ---
            models::calendar::Event,
            models::calendar::Bulletin,
            models::calendar::CreateEventPayload,
            models::calendar::CreateBulletinPayload,

            // --- Documents ---
            models::documents::DocumentCategory,
            models::documents::DocumentContent,
            models::documents::Document,
            models::documents::CreateDocumentPayload,

            // --- Chat ---
            models::chat::ChatRole,
            models::chat::ChatMessage,
            models::chat::Chat,
            models::chat::SendMessagePayload,
            models::chat::SetActiveChatPayload,
            models::chat::CompletionPayload,
            models::chat::CompletionResponse,
            handlers::chat::ActiveChatResponse,
            handlers::chat::ChatsRemovedResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, Cadastro e Sessão"),
        (name = "Users", description = "Perfil do Usuário"),
        (name = "Admin", description = "Painel Administrativo (Aprovação de Secretarias e Usuários)"),
        (name = "Tickets", description = "Chamados de Suporte"),
        (name = "Calendar", description = "Calendário e Mural de Avisos"),
        (name = "Documents", description = "Memorial de Gestão"),
        (name = "Chat", description = "Assistente Virtual")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
