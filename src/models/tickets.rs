// src/models/tickets.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, db::Record};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

// Visões da listagem: todos, em aberto (open + in_progress) e concluídos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketFilter {
    #[default]
    #[serde(alias = "todos")]
    All,
    #[serde(alias = "abertos")]
    Active,
    #[serde(alias = "concluidos")]
    Closed,
}

impl TicketFilter {
    pub fn matches(self, status: TicketStatus) -> bool {
        match self {
            TicketFilter::All => true,
            TicketFilter::Active => status != TicketStatus::Closed,
            TicketFilter::Closed => status == TicketStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    #[serde(default)]
    pub status: TicketFilter,
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub ticket_id: Uuid,
    #[schema(example = "Estamos analisando a sua solicitação.")]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub from_staff: bool,
}

/// Chamado de assessoria.
///
/// Invariante: `closing_note` existe se e somente se `status == Closed`.
/// Os campos só mudam pelos métodos abaixo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Dúvida sobre o Censo Escolar")]
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub replies: Vec<Reply>,
    pub closing_note: Option<String>,
}

impl Ticket {
    pub fn open(
        tenant_id: Uuid,
        owner_id: Uuid,
        title: String,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            title,
            description,
            status: TicketStatus::Open,
            opened_at: now,
            updated_at: now,
            owner_id,
            replies: Vec::new(),
            closing_note: None,
        }
    }

    /// Anexa uma resposta. A primeira resposta da equipe move `open -> in_progress`;
    /// respostas de quem não é equipe nunca mudam o status.
    pub fn add_reply(
        &mut self,
        text: String,
        from_staff: bool,
        now: DateTime<Utc>,
    ) -> Result<Reply, AppError> {
        if self.status == TicketStatus::Closed {
            return Err(AppError::TicketClosed);
        }

        let reply = Reply {
            id: Uuid::new_v4(),
            ticket_id: self.id,
            text,
            created_at: now,
            from_staff,
        };
        self.replies.push(reply.clone());
        if from_staff && self.status == TicketStatus::Open {
            self.status = TicketStatus::InProgress;
        }
        self.updated_at = now;

        Ok(reply)
    }

    /// "Iniciar atendimento" sem responder.
    pub fn start_attendance(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        match self.status {
            TicketStatus::Open => {
                self.status = TicketStatus::InProgress;
                self.updated_at = now;
                Ok(())
            }
            TicketStatus::InProgress => Err(AppError::InvalidTransition(
                "in_progress -> in_progress".into(),
            )),
            TicketStatus::Closed => Err(AppError::TicketClosed),
        }
    }

    pub fn close(&mut self, note: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.status == TicketStatus::Closed {
            return Err(AppError::TicketClosed);
        }
        let note = note.trim();
        if note.is_empty() {
            return Err(AppError::ClosingNoteRequired);
        }

        self.status = TicketStatus::Closed;
        self.closing_note = Some(note.to_string());
        self.updated_at = now;
        Ok(())
    }
}

impl Record for Ticket {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.owner_id)
    }

    fn is_consistent(&self) -> bool {
        let has_note = self
            .closing_note
            .as_deref()
            .is_some_and(|note| !note.trim().is_empty());
        has_note == (self.status == TicketStatus::Closed)
            && self.replies.iter().all(|reply| reply.ticket_id == self.id)
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OpenTicketPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    #[schema(example = "Dúvida sobre o Censo Escolar")]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplyPayload {
    #[serde(default)]
    pub text: String,
}

// A nota vazia é recusada pelo próprio chamado, com erro específico.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseTicketPayload {
    #[serde(default, alias = "note")]
    pub closing_note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Merenda".into(),
            "Atraso na entrega".into(),
            Utc::now(),
        )
    }

    #[test]
    fn staff_reply_moves_open_to_in_progress() {
        let mut t = ticket();
        t.add_reply("Recebido".into(), true, Utc::now()).unwrap();
        assert_eq!(t.status, TicketStatus::InProgress);
    }

    #[test]
    fn non_staff_reply_keeps_status() {
        let mut t = ticket();
        t.add_reply("Alguma novidade?".into(), false, Utc::now()).unwrap();
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.replies.len(), 1);
    }

    #[test]
    fn replies_keep_insertion_order() {
        let mut t = ticket();
        for text in ["um", "dois", "três"] {
            t.add_reply(text.into(), false, Utc::now()).unwrap();
        }
        let texts: Vec<&str> = t.replies.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["um", "dois", "três"]);
    }

    #[test]
    fn close_requires_a_note() {
        let mut t = ticket();
        assert!(matches!(t.close("   ", Utc::now()), Err(AppError::ClosingNoteRequired)));
        assert_eq!(t.status, TicketStatus::Open);
        assert!(t.closing_note.is_none());

        t.close(" resolvido ", Utc::now()).unwrap();
        assert_eq!(t.status, TicketStatus::Closed);
        assert_eq!(t.closing_note.as_deref(), Some("resolvido"));
        assert!(t.is_consistent());
    }

    #[test]
    fn closed_ticket_is_immutable() {
        let mut t = ticket();
        t.close("ok", Utc::now()).unwrap();
        let before = t.clone();

        assert!(matches!(t.add_reply("oi".into(), true, Utc::now()), Err(AppError::TicketClosed)));
        assert!(matches!(t.close("de novo", Utc::now()), Err(AppError::TicketClosed)));
        assert!(matches!(t.start_attendance(Utc::now()), Err(AppError::TicketClosed)));
        assert_eq!(t, before);
    }

    #[test]
    fn note_without_closed_status_is_inconsistent() {
        let mut t = ticket();
        t.closing_note = Some("nota solta".into());
        assert!(!t.is_consistent());
    }

    #[test]
    fn filter_views() {
        assert!(TicketFilter::Active.matches(TicketStatus::InProgress));
        assert!(!TicketFilter::Active.matches(TicketStatus::Closed));
        assert!(TicketFilter::Closed.matches(TicketStatus::Closed));
        assert!(TicketFilter::All.matches(TicketStatus::Open));
    }
}
