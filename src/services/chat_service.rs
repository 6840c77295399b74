// src/services/chat_service.rs

use std::{cmp::Reverse, sync::Arc};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::Caller,
        chat::{title_from, ActiveChat, Chat, ChatMessage, CompletionPayload},
    },
    services::completion::CompletionProvider,
};

// Falhas do provedor viram uma resposta do assistente, não um erro da conversa.
fn synthetic_reply(error: &AppError) -> Option<String> {
    let reason = match error {
        AppError::Upstream(reason) => reason.as_str(),
        AppError::ProviderNotConfigured => "OPENAI_API_KEY não configurada",
        _ => return None,
    };
    Some(format!(
        "Desculpe, ocorreu um erro: {reason}. Por favor, tente novamente."
    ))
}

#[derive(Clone)]
pub struct ChatService {
    chats: Arc<dyn Repository<Chat>>,
    active: Arc<dyn Repository<ActiveChat>>,
    provider: Arc<dyn CompletionProvider>,
    write_lock: Arc<Mutex<()>>,
}

impl ChatService {
    pub fn new(
        chats: Arc<dyn Repository<Chat>>,
        active: Arc<dyn Repository<ActiveChat>>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            chats,
            active,
            provider,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---
    // Proxy direto
    // ---

    /// Repassa uma lista ordenada de mensagens ao provedor e devolve a resposta.
    /// Chave ausente tem precedência sobre corpo malformado.
    pub async fn proxy(&self, body: Value) -> Result<String, AppError> {
        if !self.provider.is_configured() {
            return Err(AppError::ProviderNotConfigured);
        }

        let payload: CompletionPayload = serde_json::from_value(body).map_err(|_| AppError::InvalidField {
            field: "messages",
            reason: "malformed",
        })?;
        if payload.messages.is_empty() {
            return Err(AppError::MissingField("messages"));
        }

        self.provider.complete(&payload.messages).await
    }

    // ---
    // Conversas
    // ---

    pub async fn list(&self, caller: &Caller) -> Result<Vec<Chat>, AppError> {
        let mut chats = self.chats.load(&caller.scope()).await?;
        chats.sort_by_key(|c| Reverse(c.updated_at));
        Ok(chats)
    }

    pub async fn get(&self, caller: &Caller, chat_id: Uuid) -> Result<Chat, AppError> {
        self.chats
            .get_scoped(&caller.scope(), chat_id)
            .await?
            .ok_or(AppError::NotFound("conversa"))
    }

    /// Nova conversa com a mensagem de boas-vindas; passa a ser a conversa ativa.
    pub async fn create(&self, caller: &Caller) -> Result<Chat, AppError> {
        let chat = self
            .chats
            .put(Chat::start(caller.tenant_id, caller.user_id, Utc::now()))
            .await?;
        self.point_to(caller, chat.id).await?;

        tracing::debug!(user_id = %caller.user_id, chat_id = %chat.id, "Conversa criada");
        Ok(chat)
    }

    /// Grava a mensagem do usuário, consulta o provedor e grava a resposta.
    /// O lock não é mantido durante a chamada ao provedor.
    pub async fn send_message(&self, caller: &Caller, chat_id: Uuid, content: &str) -> Result<Chat, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::MissingField("content"));
        }

        let history = {
            let _guard = self.write_lock.lock().await;
            let mut chat = self.get(caller, chat_id).await?;
            if !chat.has_user_message() {
                chat.title = title_from(content);
            }
            chat.messages.push(ChatMessage::user(content));
            chat.updated_at = Utc::now();
            self.chats.put(chat).await?.messages
        };

        let answer = match self.provider.complete(&history).await {
            Ok(text) => text,
            Err(e) => match synthetic_reply(&e) {
                Some(text) => {
                    tracing::warn!(chat_id = %chat_id, error = %e, "Resposta do assistente substituída por aviso de erro");
                    text
                }
                None => return Err(e),
            },
        };

        let _guard = self.write_lock.lock().await;
        let mut chat = self.get(caller, chat_id).await?;
        chat.messages.push(ChatMessage::ai(answer));
        chat.updated_at = Utc::now();
        self.chats.put(chat).await
    }

    pub async fn delete(&self, caller: &Caller, chat_id: Uuid) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let chat = self.get(caller, chat_id).await?;
        self.chats.delete(chat.id).await?;

        let pointer = self.pointer(caller).await?;
        if let Some(pointer) = pointer.filter(|p| p.chat_id == chat.id) {
            self.active.delete(pointer.id).await?;
        }
        Ok(())
    }

    /// Apaga todas as conversas do usuário atual. Retorna quantas foram apagadas.
    pub async fn delete_all(&self, caller: &Caller) -> Result<usize, AppError> {
        let _guard = self.write_lock.lock().await;
        let chats = self.chats.load(&caller.scope()).await?;
        for chat in &chats {
            self.chats.delete(chat.id).await?;
        }
        if let Some(pointer) = self.pointer(caller).await? {
            self.active.delete(pointer.id).await?;
        }

        tracing::info!(user_id = %caller.user_id, removed = chats.len(), "Conversas apagadas");
        Ok(chats.len())
    }

    // ---
    // Conversa ativa
    // ---

    /// A última conversa aberta, se ainda existir.
    pub async fn active_id(&self, caller: &Caller) -> Result<Option<Uuid>, AppError> {
        let Some(pointer) = self.pointer(caller).await? else {
            return Ok(None);
        };
        let exists = self
            .chats
            .get_scoped(&caller.scope(), pointer.chat_id)
            .await?
            .is_some();
        Ok(exists.then_some(pointer.chat_id))
    }

    pub async fn set_active(&self, caller: &Caller, chat_id: Uuid) -> Result<(), AppError> {
        self.get(caller, chat_id).await?;
        self.point_to(caller, chat_id).await
    }

    // O ponteiro do usuário na secretaria atual
    async fn pointer(&self, caller: &Caller) -> Result<Option<ActiveChat>, AppError> {
        let id = ActiveChat::pointer_id(caller.tenant_id, caller.user_id);
        self.active.get_scoped(&caller.scope(), id).await
    }

    async fn point_to(&self, caller: &Caller, chat_id: Uuid) -> Result<(), AppError> {
        self.active
            .put(ActiveChat::new(caller.tenant_id, caller.user_id, chat_id, Utc::now()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        db::{keys, LocalStore},
        models::{
            chat::{ChatRole, WELCOME_MESSAGE},
            rbac::Role,
        },
    };
    use async_trait::async_trait;

    /// Provedor falso: ecoa a última mensagem ou falha com o motivo dado.
    pub(crate) struct FakeProvider {
        pub failure: Option<String>,
        pub configured: bool,
    }

    impl FakeProvider {
        pub fn echo() -> Self {
            Self {
                failure: None,
                configured: true,
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
            if !self.configured {
                return Err(AppError::ProviderNotConfigured);
            }
            if let Some(reason) = &self.failure {
                return Err(AppError::Upstream(reason.clone()));
            }
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
            Ok(format!("eco: {last}"))
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn service(provider: FakeProvider) -> ChatService {
        ChatService::new(
            Arc::new(LocalStore::<Chat>::in_memory(keys::CHATS)),
            Arc::new(LocalStore::<ActiveChat>::in_memory(keys::ACTIVE_CHAT)),
            Arc::new(provider),
        )
    }

    fn caller() -> Caller {
        Caller {
            user_id: Uuid::new_v4(),
            role: Role::Gestor,
            tenant_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn conversation_flow() {
        let svc = service(FakeProvider::echo());
        let me = caller();
        let chat = svc.create(&me).await.unwrap();
        assert_eq!(chat.messages[0].content, WELCOME_MESSAGE);
        assert_eq!(svc.active_id(&me).await.unwrap(), Some(chat.id));

        let chat = svc
            .send_message(&me, chat.id, "Quais são os prazos do Censo Escolar deste ano?")
            .await
            .unwrap();
        assert_eq!(chat.title, "Quais são os prazos do Censo E...");
        assert_eq!(chat.messages.len(), 3);
        assert_eq!(chat.messages[2].role, ChatRole::Ai);
        assert!(chat.messages[2].content.starts_with("eco: Quais"));

        // O título não muda nas mensagens seguintes
        let chat = svc.send_message(&me, chat.id, "Obrigado").await.unwrap();
        assert_eq!(chat.title, "Quais são os prazos do Censo E...");
    }

    #[tokio::test]
    async fn provider_failure_becomes_assistant_reply() {
        let svc = service(FakeProvider {
            failure: Some("rate limit".into()),
            configured: true,
        });
        let me = caller();
        let chat = svc.create(&me).await.unwrap();

        let chat = svc.send_message(&me, chat.id, "Olá").await.unwrap();
        let last = chat.messages.last().unwrap();
        assert_eq!(last.role, ChatRole::Ai);
        assert!(last.content.contains("rate limit"));
    }

    #[tokio::test]
    async fn chats_are_private_to_their_user() {
        let svc = service(FakeProvider::echo());
        let me = caller();
        let colleague = Caller {
            user_id: Uuid::new_v4(),
            ..me
        };
        let chat = svc.create(&me).await.unwrap();

        assert!(svc.list(&colleague).await.unwrap().is_empty());
        assert!(matches!(svc.get(&colleague, chat.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.set_active(&colleague, chat.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_clears_the_active_pointer() {
        let svc = service(FakeProvider::echo());
        let me = caller();
        let first = svc.create(&me).await.unwrap();
        let second = svc.create(&me).await.unwrap();

        svc.set_active(&me, first.id).await.unwrap();
        svc.delete(&me, first.id).await.unwrap();
        assert_eq!(svc.active_id(&me).await.unwrap(), None);

        assert_eq!(svc.delete_all(&me).await.unwrap(), 1);
        assert!(svc.list(&me).await.unwrap().is_empty());
        assert!(matches!(svc.get(&me, second.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn each_tenant_keeps_its_own_active_chat() {
        let svc = service(FakeProvider::echo());
        let root = Caller {
            user_id: Uuid::new_v4(),
            role: Role::Superadmin,
            tenant_id: Uuid::new_v4(),
        };
        let elsewhere = Caller {
            tenant_id: Uuid::new_v4(),
            ..root
        };

        let here = svc.create(&root).await.unwrap();
        let there = svc.create(&elsewhere).await.unwrap();
        assert_eq!(svc.active_id(&root).await.unwrap(), Some(here.id));
        assert_eq!(svc.active_id(&elsewhere).await.unwrap(), Some(there.id));

        svc.delete_all(&elsewhere).await.unwrap();
        assert_eq!(svc.active_id(&elsewhere).await.unwrap(), None);
        assert_eq!(svc.active_id(&root).await.unwrap(), Some(here.id));
    }

    #[tokio::test]
    async fn proxy_checks_key_before_body() {
        let svc = service(FakeProvider {
            failure: None,
            configured: false,
        });
        let result = svc.proxy(serde_json::json!({"nope": true})).await;
        assert!(matches!(result, Err(AppError::ProviderNotConfigured)));

        let svc = service(FakeProvider::echo());
        let result = svc.proxy(serde_json::json!({"messages": "texto"})).await;
        assert!(matches!(result, Err(AppError::InvalidField { field: "messages", .. })));

        let reply = svc
            .proxy(serde_json::json!({"messages": [{"role": "user", "content": "oi"}]}))
            .await
            .unwrap();
        assert_eq!(reply, "eco: oi");
    }
}
