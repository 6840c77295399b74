// src/services/ticket_service.rs

use std::{cmp::Reverse, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::Caller,
        rbac::{can_access, Capability},
        tickets::{OpenTicketPayload, Ticket, TicketFilter},
    },
};

#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn Repository<Ticket>>,
    write_lock: Arc<Mutex<()>>,
}

impl TicketService {
    pub fn new(tickets: Arc<dyn Repository<Ticket>>) -> Self {
        Self {
            tickets,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Chamados da secretaria, os atualizados mais recentemente primeiro.
    pub async fn list(&self, caller: &Caller, filter: TicketFilter) -> Result<Vec<Ticket>, AppError> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .load(&caller.scope())
            .await?
            .into_iter()
            .filter(|t| filter.matches(t.status))
            .collect();
        tickets.sort_by_key(|t| Reverse(t.updated_at));
        Ok(tickets)
    }

    pub async fn get(&self, caller: &Caller, ticket_id: Uuid) -> Result<Ticket, AppError> {
        self.tickets
            .get_scoped(&caller.scope(), ticket_id)
            .await?
            .ok_or(AppError::NotFound("chamado"))
    }

    pub async fn open(&self, caller: &Caller, payload: OpenTicketPayload) -> Result<Ticket, AppError> {
        payload.validate()?;

        let ticket = Ticket::open(
            caller.tenant_id,
            caller.user_id,
            payload.title.trim().to_string(),
            payload.description.trim().to_string(),
            Utc::now(),
        );
        let ticket = self.tickets.put(ticket).await?;

        tracing::info!(tenant_id = %caller.tenant_id, ticket_id = %ticket.id, "Chamado aberto");
        Ok(ticket)
    }

    /// Resposta de qualquer membro da secretaria; `from_staff` vem do nível guardado, não do cliente.
    pub async fn reply(&self, caller: &Caller, ticket_id: Uuid, text: &str) -> Result<Ticket, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::MissingField("text"));
        }

        self.modify(caller, ticket_id, |ticket| {
            ticket.add_reply(text.to_string(), caller.is_staff(), Utc::now()).map(|_| ())
        })
        .await
    }

    pub async fn start_attendance(&self, caller: &Caller, ticket_id: Uuid) -> Result<Ticket, AppError> {
        ensure(caller, Capability::EditOwnTicketStatus)?;
        self.modify(caller, ticket_id, |ticket| ticket.start_attendance(Utc::now()))
            .await
    }

    pub async fn close(&self, caller: &Caller, ticket_id: Uuid, note: &str) -> Result<Ticket, AppError> {
        ensure(caller, Capability::CloseTicket)?;
        let ticket = self
            .modify(caller, ticket_id, |ticket| ticket.close(note, Utc::now()))
            .await?;

        tracing::info!(tenant_id = %caller.tenant_id, ticket_id = %ticket_id, "Chamado concluído");
        Ok(ticket)
    }

    // Lê, altera e grava sob o lock. Se a alteração falhar, nada é gravado.
    async fn modify<F>(&self, caller: &Caller, ticket_id: Uuid, f: F) -> Result<Ticket, AppError>
    where
        F: FnOnce(&mut Ticket) -> Result<(), AppError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut ticket = self.get(caller, ticket_id).await?;
        f(&mut ticket)?;
        self.tickets.put(ticket).await
    }
}

fn ensure(caller: &Caller, capability: Capability) -> Result<(), AppError> {
    if can_access(caller.role, capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(capability.slug()))
    }
}
