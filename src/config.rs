// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;

use crate::{
    common::i18n::I18nStore,
    db::{keys, LocalStore, Record},
    services::{
        auth::AuthService,
        calendar_service::CalendarService,
        chat_service::ChatService,
        completion::{CompletionProvider, OpenAiProvider},
        document_service::DocumentService,
        lifecycle_service::LifecycleService,
        ticket_service::TicketService,
    },
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
// Um ano; acima disso a expiração deixa de ser uma data representável com folga
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

// Superadmin criado na inicialização, se ainda não existir
#[derive(Debug, Clone)]
pub struct SuperadminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    // Sem diretório, os caches ficam só em memória
    pub data_dir: Option<PathBuf>,
    pub bcrypt_cost: u32,
    pub superadmin: Option<SuperadminSeed>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} inválido: {raw}")),
        None => Ok(default),
    }
}

/// Validade da sessão em horas: positiva e no máximo um ano.
fn checked_session_ttl(hours: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        anyhow::bail!("SESSION_TTL_HOURS deve estar entre 1 e {MAX_SESSION_TTL_HOURS}, recebido {hours}");
    }
    chrono::Duration::try_hours(hours).context("SESSION_TTL_HOURS fora do intervalo")?;
    Ok(hours)
}

impl Settings {
    /// Lê o `.env` (se houver) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = optional("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let superadmin = match (optional("SUPERADMIN_EMAIL"), optional("SUPERADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperadminSeed {
                email,
                password,
                name: optional("SUPERADMIN_NAME").unwrap_or_else(|| "Super Administrador".to_string()),
            }),
            (Some(_), None) => anyhow::bail!("SUPERADMIN_PASSWORD deve ser definido junto com SUPERADMIN_EMAIL"),
            _ => None,
        };

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            session_ttl_hours: checked_session_ttl(parsed("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?)?,
            cookie_secure: parsed("COOKIE_SECURE", false)?,
            data_dir: optional("DATA_DIR").map(PathBuf::from),
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            superadmin,
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: optional("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

async fn open_store<T: Record>(settings: &Settings, key: &'static str) -> anyhow::Result<Arc<LocalStore<T>>> {
    let store = match &settings.data_dir {
        Some(dir) => LocalStore::open(dir, key)
            .await
            .with_context(|| format!("Falha ao abrir o cache '{key}'"))?,
        None => LocalStore::in_memory(key),
    };
    Ok(Arc::new(store))
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub lifecycle_service: LifecycleService,
    pub ticket_service: TicketService,
    pub calendar_service: CalendarService,
    pub document_service: DocumentService,
    pub chat_service: ChatService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let provider = Arc::new(OpenAiProvider::new(
            settings.openai_api_key.clone(),
            settings.openai_base_url.clone(),
            settings.openai_model.clone(),
        ));
        if settings.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY não definida: o assistente responderá com erro");
        }

        let app_state = Self::with_provider(settings, provider).await?;

        if let Some(seed) = &app_state.settings.superadmin {
            app_state
                .auth_service
                .bootstrap_superadmin(&seed.email, &seed.password, &seed.name)
                .await
                .context("Falha ao criar o superadmin inicial")?;
        }

        Ok(app_state)
    }

    // --- Monta o gráfico de dependências ---
    pub async fn with_provider(
        settings: Settings,
        provider: Arc<dyn CompletionProvider>,
    ) -> anyhow::Result<Self> {
        let tenants = open_store(&settings, keys::TENANTS).await?;
        let users = open_store(&settings, keys::USERS).await?;
        let tickets = open_store(&settings, keys::TICKETS).await?;
        let events = open_store(&settings, keys::EVENTS).await?;
        let bulletins = open_store(&settings, keys::BULLETINS).await?;
        let documents = open_store(&settings, keys::DOCUMENTS).await?;
        let chats = open_store(&settings, keys::CHATS).await?;
        let active_chats = open_store(&settings, keys::ACTIVE_CHAT).await?;

        match &settings.data_dir {
            Some(dir) => tracing::info!(dir = %dir.display(), "✅ Caches locais carregados"),
            None => tracing::info!("DATA_DIR não definido: dados apenas em memória"),
        }

        let auth_service = AuthService::new(
            users.clone(),
            tenants.clone(),
            settings.jwt_secret.clone(),
            settings.session_ttl(),
            settings.bcrypt_cost,
        );

        Ok(Self {
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            lifecycle_service: LifecycleService::new(tenants, users),
            ticket_service: TicketService::new(tickets),
            calendar_service: CalendarService::new(events, bulletins),
            document_service: DocumentService::new(documents),
            chat_service: ChatService::new(chats, active_chats, provider),
            settings: Arc::new(settings),
        })
    }
}
