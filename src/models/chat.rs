// src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::Record;

pub const WELCOME_MESSAGE: &str =
    "Olá! Sou o assistente do Suporte Edu. Como posso ajudar sua secretaria de educação hoje?";
pub const DEFAULT_TITLE: &str = "Nova conversa";
const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "assistant")]
    Ai,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[schema(example = "Como faço a prestação de contas do PNAE?")]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

/// Conversa com o assistente; só o próprio usuário a enxerga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn start(tenant_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            user_id,
            title: DEFAULT_TITLE.to_string(),
            messages: vec![ChatMessage::ai(WELCOME_MESSAGE)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == ChatRole::User)
    }
}

impl Record for Chat {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn is_private(&self) -> bool {
        true
    }
}

/// Título a partir da primeira mensagem: 30 caracteres e "..." se passar disso.
pub fn title_from(first_message: &str) -> String {
    let text = first_message.trim();
    if text.chars().count() > TITLE_MAX_CHARS {
        let cut: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

const ACTIVE_CHAT_NAMESPACE: Uuid = Uuid::from_u128(0x2b7e_91d0_45a3_4c6f_8e12_d9a0_7f34_c5b8);

// Ponteiro para a última conversa aberta; um registro por usuário e secretaria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChat {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub chat_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl ActiveChat {
    /// Id do ponteiro: derivado da secretaria e do usuário, para que o superadmin
    /// tenha um ponteiro independente em cada secretaria.
    pub fn pointer_id(tenant_id: Uuid, user_id: Uuid) -> Uuid {
        let mut name = [0u8; 32];
        name[..16].copy_from_slice(tenant_id.as_bytes());
        name[16..].copy_from_slice(user_id.as_bytes());
        Uuid::new_v5(&ACTIVE_CHAT_NAMESPACE, &name)
    }

    pub fn new(tenant_id: Uuid, user_id: Uuid, chat_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::pointer_id(tenant_id, user_id),
            user_id,
            tenant_id,
            chat_id,
            updated_at: now,
        }
    }
}

impl Record for ActiveChat {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn is_private(&self) -> bool {
        true
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessagePayload {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveChatPayload {
    pub chat_id: Uuid,
}

// Proxy direto para o provedor: lista ordenada de mensagens, uma resposta.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompletionPayload {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub ai_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_kept() {
        assert_eq!(title_from("  Dúvida sobre FUNDEB "), "Dúvida sobre FUNDEB");
    }

    #[test]
    fn long_titles_are_cut_at_thirty_chars() {
        let title = title_from("Como calcular o repasse do transporte escolar rural?");
        assert_eq!(title, "Como calcular o repasse do tra...");
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn assistant_is_read_as_ai() {
        let msg: ChatMessage =
            serde_json::from_value(serde_json::json!({"role": "assistant", "content": "oi"}))
                .unwrap();
        assert_eq!(msg.role, ChatRole::Ai);
    }

    #[test]
    fn new_chat_starts_with_welcome() {
        let chat = Chat::start(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        assert_eq!(chat.messages, vec![ChatMessage::ai(WELCOME_MESSAGE)]);
        assert!(!chat.has_user_message());
    }
}
