// src/tests.rs
//
// Cenários de ponta a ponta contra o router real, com stores em memória.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app,
    config::{AppState, Settings, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL},
    services::chat_service::tests::FakeProvider,
};

const ROOT_EMAIL: &str = "root@suporte.edu";
const ROOT_PASSWORD: &str = "root-senha";

fn settings() -> Settings {
    Settings {
        bind_addr: "127.0.0.1:0".into(),
        jwt_secret: "segredo-de-teste".into(),
        session_ttl_hours: 24,
        cookie_secure: false,
        data_dir: None,
        bcrypt_cost: 4,
        superadmin: None,
        openai_api_key: None,
        openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
        openai_model: DEFAULT_OPENAI_MODEL.into(),
    }
}

struct TestApp {
    router: Router,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn setup() -> TestApp {
    let state = AppState::with_provider(settings(), Arc::new(FakeProvider::echo()))
        .await
        .unwrap();
    state
        .auth_service
        .bootstrap_superadmin(ROOT_EMAIL, ROOT_PASSWORD, "Root")
        .await
        .unwrap();
    TestApp { router: app(state) }
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        tenant: Option<Uuid>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(tenant) = tenant {
            builder = builder.header("x-tenant-id", tenant.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn login(&self, email: &str, password: &str) -> Reply {
        self.call(
            "POST",
            "/api/auth/login",
            None,
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn token(&self, email: &str, password: &str) -> String {
        let reply = self.login(email, password).await;
        assert_eq!(reply.status, StatusCode::OK, "login de {email}: {}", reply.body);
        reply.body["token"].as_str().unwrap().to_string()
    }

    async fn root(&self) -> String {
        self.token(ROOT_EMAIL, ROOT_PASSWORD).await
    }

    async fn signup(&self, email: &str, tenant_name: &str) -> Reply {
        self.call(
            "POST",
            "/api/auth/signup",
            None,
            None,
            Some(json!({
                "tenantName": tenant_name,
                "municipality": "Nova Cidade",
                "state": "MG",
                "managerName": "Maria Souza",
                "email": email,
                "jobTitle": "Secretária de Educação",
                "password": "segredo123"
            })),
        )
        .await
    }

    async fn pending_ids(&self, root: &str, email: &str) -> (Uuid, Uuid) {
        let users = self
            .call("GET", "/api/admin/users?status=pending", Some(root), None, None)
            .await;
        let user = users.body.as_array().unwrap().iter().find(|u| u["email"] == email).unwrap().clone();
        let user_id: Uuid = serde_json::from_value(user["id"].clone()).unwrap();
        let tenant_id: Uuid = serde_json::from_value(user["tenantId"].clone()).unwrap();
        (tenant_id, user_id)
    }

    /// Cadastro aprovado por completo: devolve (secretaria, token do gestor).
    async fn active_gestor(&self, root: &str, email: &str) -> (Uuid, String) {
        assert_eq!(self.signup(email, &format!("SME {email}")).await.status, StatusCode::OK);
        let (tenant_id, user_id) = self.pending_ids(root, email).await;
        let uri = format!("/api/admin/tenants/{tenant_id}/approve");
        assert_eq!(self.call("POST", &uri, Some(root), None, None).await.status, StatusCode::OK);
        let uri = format!("/api/admin/users/{user_id}/approve");
        assert_eq!(self.call("POST", &uri, Some(root), None, None).await.status, StatusCode::OK);
        (tenant_id, self.token(email, "segredo123").await)
    }
}

// =============================================================================
//  CADASTRO E SESSÃO
// =============================================================================

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = setup().await;

    let first = app.signup("a@b.com", "SME Um").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["success"], true);

    // Mesmo e-mail, em maiúsculas, com outra secretaria
    let second = app.signup("A@B.com", "SME Dois").await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    // Nenhuma secretaria órfã ficou do segundo cadastro
    let root = app.root().await;
    let tenants = app
        .call("GET", "/api/admin/tenants?status=pending", Some(&root), None, None)
        .await;
    assert_eq!(tenants.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn signup_missing_fields_is_rejected() {
    let app = setup().await;
    let reply = app
        .call("POST", "/api/auth/signup", None, None, Some(json!({ "email": "x@y.com" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures() {
    let app = setup().await;

    let missing = app.login("", "").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let wrong = app.login(ROOT_EMAIL, "errada").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert!(wrong.headers.get(header::SET_COOKIE).is_none());

    // Cadastro pendente ainda não entra
    app.signup("pendente@b.com", "SME Pendente").await;
    let pending = app.login("pendente@b.com", "segredo123").await;
    assert_eq!(pending.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_tenant_blocks_login() {
    let app = setup().await;
    let root = app.root().await;
    let (tenant_id, token) = app.active_gestor(&root, "gestor@b.com").await;

    let uri = format!("/api/admin/tenants/{tenant_id}/deactivate");
    let reply = app.call("POST", &uri, Some(&root), None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["active"], false);

    let login = app.login("gestor@b.com", "segredo123").await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);
    assert!(login.headers.get(header::SET_COOKIE).is_none());

    // A sessão antiga também deixa de valer
    let me = app.call("GET", "/api/auth/me", Some(&token), None, None).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_cookie_round_trip() {
    let app = setup().await;
    let login = app.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body["user"].get("passwordHash").is_none());
    assert!(login.body["tenant"].is_null());

    let cookie = login.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=86400"));

    // Só o par nome=valor volta no cabeçalho Cookie
    let pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let me = app.send(request).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], ROOT_EMAIL);

    let logout = app.call("POST", "/api/auth/logout", None, None, None).await;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = logout.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn me_requires_a_valid_credential() {
    let app = setup().await;
    let missing = app.call("GET", "/api/auth/me", None, None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app.call("GET", "/api/auth/me", Some("nao.e.um.jwt"), None, None).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_loses_the_session() {
    let app = setup().await;
    let root = app.root().await;
    let (_, token) = app.active_gestor(&root, "gestor@b.com").await;

    let me = app.call("GET", "/api/auth/me", Some(&token), None, None).await;
    assert_eq!(me.status, StatusCode::OK);
    let user_id = me.body["user"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/users/{user_id}/deactivate");
    assert_eq!(app.call("POST", &uri, Some(&root), None, None).await.status, StatusCode::OK);

    let me = app.call("GET", "/api/auth/me", Some(&token), None, None).await;
    assert_eq!(me.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn password_reset_never_reveals_accounts() {
    let app = setup().await;
    for email in [ROOT_EMAIL, "ninguem@b.com"] {
        let reply = app
            .call(
                "POST",
                "/api/auth/password-reset-request",
                None,
                None,
                Some(json!({ "email": email })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["success"], true);
    }

    let missing = app
        .call("POST", "/api/auth/password-reset-request", None, None, Some(json!({})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
//  PAINEL ADMINISTRATIVO
// =============================================================================

#[tokio::test]
async fn approving_a_tenant_moves_it_between_lists() {
    let app = setup().await;
    let root = app.root().await;
    app.signup("gestor@b.com", "SME Nova Cidade").await;
    let (tenant_id, _) = app.pending_ids(&root, "gestor@b.com").await;

    let uri = format!("/api/admin/tenants/{tenant_id}/approve");
    let approved = app.call("POST", &uri, Some(&root), None, None).await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["active"], true);

    let pending = app
        .call("GET", "/api/admin/tenants?status=pending", Some(&root), None, None)
        .await;
    assert!(pending.body.as_array().unwrap().is_empty());

    let active = app
        .call("GET", "/api/admin/tenants?status=active", Some(&root), None, None)
        .await;
    let active = active.body.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], tenant_id.to_string());
    assert_eq!(active[0]["active"], true);

    let summary = app.call("GET", "/api/admin/summary", Some(&root), None, None).await;
    assert_eq!(summary.body["tenants"]["active"], 1);
    assert_eq!(summary.body["users"]["pending"], 1);
}

#[tokio::test]
async fn rejecting_twice_is_not_found() {
    let app = setup().await;
    let root = app.root().await;
    app.signup("gestor@b.com", "SME Nova Cidade").await;
    let (tenant_id, user_id) = app.pending_ids(&root, "gestor@b.com").await;

    let uri = format!("/api/admin/tenants/{tenant_id}/reject");
    assert_eq!(app.call("POST", &uri, Some(&root), None, None).await.status, StatusCode::OK);
    assert_eq!(app.call("POST", &uri, Some(&root), None, None).await.status, StatusCode::NOT_FOUND);

    // O gestor da secretaria rejeitada saiu junto
    let uri = format!("/api/admin/users/{user_id}/approve");
    assert_eq!(app.call("POST", &uri, Some(&root), None, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn console_is_staff_only() {
    let app = setup().await;
    let root = app.root().await;
    let (_, gestor) = app.active_gestor(&root, "gestor@b.com").await;

    for uri in ["/api/admin/summary", "/api/admin/tenants", "/api/admin/users"] {
        let reply = app.call("GET", uri, Some(&gestor), None, None).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{uri}");
    }

    let caps = app
        .call("GET", "/api/users/me/capabilities", Some(&gestor), None, None)
        .await;
    assert_eq!(caps.body["role"], "gestor");
    assert!(caps.body["capabilities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn promoted_admin_cannot_grant_superadmin() {
    let app = setup().await;
    let root = app.root().await;
    let (_, gestor) = app.active_gestor(&root, "gestor@b.com").await;
    let me = app.call("GET", "/api/auth/me", Some(&gestor), None, None).await;
    let user_id = me.body["user"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/users/{user_id}/role");
    let promoted = app
        .call("PUT", &uri, Some(&root), None, Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["role"], "admin");

    // O nível vem do repositório: o mesmo token já tem acesso ao painel
    let summary = app.call("GET", "/api/admin/summary", Some(&gestor), None, None).await;
    assert_eq!(summary.status, StatusCode::OK);

    let own = app
        .call("PUT", &uri, Some(&gestor), None, Some(json!({ "role": "superadmin" })))
        .await;
    assert_eq!(own.status, StatusCode::FORBIDDEN);
}

// =============================================================================
//  CHAMADOS E MULTI-TENANCY
// =============================================================================

#[tokio::test]
async fn ticket_lifecycle() {
    let app = setup().await;
    let root = app.root().await;
    let (tenant_id, gestor) = app.active_gestor(&root, "gestor@b.com").await;

    let opened = app
        .call(
            "POST",
            "/api/tickets",
            Some(&gestor),
            None,
            Some(json!({ "title": "Merenda", "description": "Atraso na entrega" })),
        )
        .await;
    assert_eq!(opened.status, StatusCode::CREATED);
    assert_eq!(opened.body["status"], "open");
    let ticket_id = opened.body["id"].as_str().unwrap().to_string();

    // A equipe de suporte responde de dentro da secretaria
    let uri = format!("/api/tickets/{ticket_id}/replies");
    let replied = app
        .call("POST", &uri, Some(&root), Some(tenant_id), Some(json!({ "text": "Verificando." })))
        .await;
    assert_eq!(replied.status, StatusCode::OK);
    assert_eq!(replied.body["status"], "in_progress");
    assert_eq!(replied.body["replies"][0]["fromStaff"], true);

    // O gestor não conclui chamados
    let close_uri = format!("/api/tickets/{ticket_id}/close");
    let denied = app
        .call("POST", &close_uri, Some(&gestor), None, Some(json!({ "closingNote": "ok" })))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let no_note = app
        .call("POST", &close_uri, Some(&root), Some(tenant_id), Some(json!({ "closingNote": "  " })))
        .await;
    assert_eq!(no_note.status, StatusCode::BAD_REQUEST);

    let closed = app
        .call("POST", &close_uri, Some(&root), Some(tenant_id), Some(json!({ "closingNote": "resolved" })))
        .await;
    assert_eq!(closed.status, StatusCode::OK);
    assert_eq!(closed.body["status"], "closed");
    assert_eq!(closed.body["closingNote"], "resolved");

    let late = app
        .call("POST", &uri, Some(&gestor), None, Some(json!({ "text": "Obrigado" })))
        .await;
    assert_eq!(late.status, StatusCode::CONFLICT);

    let closed_list = app
        .call("GET", "/api/tickets?status=closed", Some(&gestor), None, None)
        .await;
    assert_eq!(closed_list.body.as_array().unwrap().len(), 1);
    let active_list = app
        .call("GET", "/api/tickets?status=active", Some(&gestor), None, None)
        .await;
    assert!(active_list.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tenants_are_isolated() {
    let app = setup().await;
    let root = app.root().await;
    let (tenant_a, gestor_a) = app.active_gestor(&root, "a@b.com").await;
    let (_, gestor_b) = app.active_gestor(&root, "b@b.com").await;

    let opened = app
        .call(
            "POST",
            "/api/tickets",
            Some(&gestor_a),
            None,
            Some(json!({ "title": "Transporte", "description": "Rota 3" })),
        )
        .await;
    let ticket_id = opened.body["id"].as_str().unwrap().to_string();

    let uri = format!("/api/tickets/{ticket_id}");
    assert_eq!(app.call("GET", &uri, Some(&gestor_b), None, None).await.status, StatusCode::NOT_FOUND);
    let list = app.call("GET", "/api/tickets", Some(&gestor_b), None, None).await;
    assert!(list.body.as_array().unwrap().is_empty());

    // Apontar para outra secretaria pelo cabeçalho é recusado
    let crossed = app
        .call("GET", "/api/tickets", Some(&gestor_b), Some(tenant_a), None)
        .await;
    assert_eq!(crossed.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn superadmin_must_name_the_tenant() {
    let app = setup().await;
    let root = app.root().await;

    let missing = app.call("GET", "/api/tickets", Some(&root), None, None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .call("GET", "/api/tickets", Some(&root), Some(Uuid::new_v4()), None)
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri("/api/tickets")
        .header(header::AUTHORIZATION, format!("Bearer {root}"))
        .header("x-tenant-id", "loja-1")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
//  CALENDÁRIO, MEMORIAL E CHAT
// =============================================================================

#[tokio::test]
async fn official_event_is_mirrored_on_the_bulletin_board() {
    let app = setup().await;
    let root = app.root().await;
    let (_, gestor) = app.active_gestor(&root, "gestor@b.com").await;

    let created = app
        .call(
            "POST",
            "/api/calendar/events",
            Some(&gestor),
            None,
            Some(json!({
                "title": "Reunião do Conselho",
                "start": "2026-03-10T09:00:00Z",
                "end": "2026-03-10T11:00:00Z"
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let event_id = created.body["id"].as_str().unwrap().to_string();

    app.call(
        "POST",
        "/api/calendar/events",
        Some(&gestor),
        None,
        Some(json!({
            "title": "Dentista",
            "start": "2026-03-10T15:00:00Z",
            "end": "2026-03-10T16:00:00Z",
            "isPersonal": true
        })),
    )
    .await;

    let board = app.call("GET", "/api/calendar/bulletins", Some(&gestor), None, None).await;
    let board = board.body.as_array().unwrap().clone();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["title"], "Reunião do Conselho");

    let day = app
        .call("GET", "/api/calendar/events?date=2026-03-10", Some(&gestor), None, None)
        .await;
    assert_eq!(day.body.as_array().unwrap().len(), 2);

    let uri = format!("/api/calendar/events/{event_id}");
    assert_eq!(app.call("DELETE", &uri, Some(&gestor), None, None).await.status, StatusCode::NO_CONTENT);
    let board = app.call("GET", "/api/calendar/bulletins", Some(&gestor), None, None).await;
    assert!(board.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn direct_bulletins_need_post_bulletin() {
    let app = setup().await;
    let root = app.root().await;
    let (tenant_id, gestor) = app.active_gestor(&root, "gestor@b.com").await;
    let body = json!({
        "title": "Prazo do Censo",
        "content": "Envio até sexta.",
        "date": "2026-05-29T12:00:00Z",
        "isUrgent": true
    });

    let denied = app
        .call("POST", "/api/calendar/bulletins", Some(&gestor), None, Some(body.clone()))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let posted = app
        .call("POST", "/api/calendar/bulletins", Some(&root), Some(tenant_id), Some(body))
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.body["urgent"], true);
}

#[tokio::test]
async fn document_memorial() {
    let app = setup().await;
    let root = app.root().await;
    let (_, gestor) = app.active_gestor(&root, "gestor@b.com").await;

    let created = app
        .call(
            "POST",
            "/api/documents",
            Some(&gestor),
            None,
            Some(json!({
                "title": "Plano Municipal de Educação",
                "description": "Versão aprovada",
                "category": "pedagogica",
                "content": { "kind": "text", "content": "Metas 2026" },
                "tags": ["PME"]
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let found = app
        .call("GET", "/api/documents?category=pedagogica&q=pme", Some(&gestor), None, None)
        .await;
    assert_eq!(found.body.as_array().unwrap().len(), 1);

    let none = app
        .call("GET", "/api/documents?category=transporte", Some(&gestor), None, None)
        .await;
    assert!(none.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_conversation_and_proxy() {
    let app = setup().await;
    let root = app.root().await;
    let (_, gestor) = app.active_gestor(&root, "gestor@b.com").await;

    let chat = app.call("POST", "/api/chats", Some(&gestor), None, None).await;
    assert_eq!(chat.status, StatusCode::CREATED);
    let chat_id = chat.body["id"].as_str().unwrap().to_string();

    let active = app.call("GET", "/api/chats/active", Some(&gestor), None, None).await;
    assert_eq!(active.body["chatId"], chat_id.as_str());

    let uri = format!("/api/chats/{chat_id}/messages");
    let sent = app
        .call("POST", &uri, Some(&gestor), None, Some(json!({ "content": "Olá" })))
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body["title"], "Olá");
    assert_eq!(sent.body["messages"].as_array().unwrap().len(), 3);
    assert_eq!(sent.body["messages"][2]["content"], "eco: Olá");

    let proxied = app
        .call(
            "POST",
            "/api/chat",
            Some(&gestor),
            None,
            Some(json!({ "messages": [{ "role": "user", "content": "oi" }] })),
        )
        .await;
    assert_eq!(proxied.status, StatusCode::OK);
    assert_eq!(proxied.body["aiResponse"], "eco: oi");

    let malformed = app
        .call("POST", "/api/chat", Some(&gestor), None, Some(json!({ "messages": "oi" })))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let removed = app.call("DELETE", "/api/chats", Some(&gestor), None, None).await;
    assert_eq!(removed.body["removed"], 1);
}

#[tokio::test]
async fn proxy_without_provider_key_is_a_server_error() {
    let state = AppState::with_provider(
        settings(),
        Arc::new(FakeProvider {
            failure: None,
            configured: false,
        }),
    )
    .await
    .unwrap();
    state
        .auth_service
        .bootstrap_superadmin(ROOT_EMAIL, ROOT_PASSWORD, "Root")
        .await
        .unwrap();
    let app = TestApp { router: app(state) };
    let root = app.root().await;

    let reply = app
        .call("POST", "/api/chat", Some(&root), None, Some(json!({ "messages": "nada" })))
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = setup().await;
    assert_eq!(app.call("GET", "/api/health", None, None, None).await.status, StatusCode::OK);

    let doc = app.call("GET", "/api-docs/openapi.json", None, None, None).await;
    assert_eq!(doc.status, StatusCode::OK);
    assert!(doc.body["paths"].get("/api/tickets").is_some());
}
