// src/services/calendar_service.rs

use std::{cmp::Reverse, sync::Arc};

use chrono::{Days, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::Caller,
        calendar::{mirror_bulletin_id, Bulletin, CreateBulletinPayload, CreateEventPayload, Event},
        rbac::{can_access, Capability},
    },
};

// Calendário e mural de avisos. Um evento oficial e o seu aviso espelhado são
// gravados e apagados juntos, dentro da mesma operação.
#[derive(Clone)]
pub struct CalendarService {
    events: Arc<dyn Repository<Event>>,
    bulletins: Arc<dyn Repository<Bulletin>>,
    // Mantém o par evento/aviso consistente entre escritas concorrentes.
    mirror_lock: Arc<Mutex<()>>,
}

impl CalendarService {
    pub fn new(events: Arc<dyn Repository<Event>>, bulletins: Arc<dyn Repository<Bulletin>>) -> Self {
        Self {
            events,
            bulletins,
            mirror_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---
    // Eventos
    // ---

    /// Eventos visíveis (oficiais da secretaria + pessoais do próprio usuário), por início.
    pub async fn list_events(&self, caller: &Caller, day: Option<NaiveDate>) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self
            .events
            .load(&caller.scope())
            .await?
            .into_iter()
            .filter(|e| day.is_none_or(|d| e.falls_on(d)))
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    /// Eventos de amanhã, para o lembrete do calendário.
    pub async fn upcoming(&self, caller: &Caller) -> Result<Vec<Event>, AppError> {
        let tomorrow = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow::anyhow!("data fora do intervalo suportado"))?;
        self.list_events(caller, Some(tomorrow)).await
    }

    pub async fn create_event(&self, caller: &Caller, payload: CreateEventPayload) -> Result<Event, AppError> {
        payload.validate()?;
        if payload.end < payload.start {
            return Err(AppError::InvalidField {
                field: "end",
                reason: "before_start",
            });
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            tenant_id: caller.tenant_id,
            created_by: caller.user_id,
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            location: payload.location.filter(|l| !l.trim().is_empty()),
            start: payload.start,
            end: payload.end,
            all_day: payload.all_day,
            personal: payload.personal,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.mirror_lock.lock().await;
        let event = self.events.put(event).await?;

        if !event.personal {
            if let Err(e) = self.bulletins.put(Bulletin::mirror_of(&event)).await {
                // Sem o aviso, o evento oficial também não fica
                if let Err(undo) = self.events.delete(event.id).await {
                    tracing::error!(event_id = %event.id, error = %undo, "Falha ao desfazer evento sem aviso");
                }
                return Err(e);
            }
            tracing::info!(tenant_id = %caller.tenant_id, event_id = %event.id, "Evento oficial publicado no mural");
        } else {
            tracing::debug!(user_id = %caller.user_id, event_id = %event.id, "Evento pessoal criado");
        }

        Ok(event)
    }

    /// Apaga o evento e, se houver, o aviso espelhado (id derivado do evento).
    pub async fn delete_event(&self, caller: &Caller, event_id: Uuid) -> Result<(), AppError> {
        let _guard = self.mirror_lock.lock().await;

        let event = self
            .events
            .get_scoped(&caller.scope(), event_id)
            .await?
            .ok_or(AppError::NotFound("evento"))?;

        if event.created_by != caller.user_id && !can_access(caller.role, Capability::PostBulletin) {
            return Err(AppError::Forbidden(Capability::PostBulletin.slug()));
        }

        // O aviso sai primeiro: se o evento não puder ser apagado, o aviso volta.
        let mirror = self.bulletins.get(mirror_bulletin_id(event.id)).await?;
        if let Some(mirror) = &mirror {
            self.bulletins.delete(mirror.id).await?;
        }
        if let Err(e) = self.events.delete(event.id).await {
            if let Some(mirror) = mirror {
                if let Err(undo) = self.bulletins.put(mirror).await {
                    tracing::error!(event_id = %event.id, error = %undo, "Falha ao restaurar aviso espelhado");
                }
            }
            return Err(e);
        }
        let mirror_removed = mirror.is_some();

        tracing::info!(tenant_id = %caller.tenant_id, event_id = %event.id, mirror_removed, "Evento removido");
        Ok(())
    }

    // ---
    // Mural de avisos
    // ---

    /// Avisos da secretaria, data mais recente primeiro.
    pub async fn list_bulletins(&self, caller: &Caller) -> Result<Vec<Bulletin>, AppError> {
        let mut bulletins = self.bulletins.load(&caller.scope()).await?;
        bulletins.sort_by_key(|b| Reverse(b.date));
        Ok(bulletins)
    }

    pub async fn create_bulletin(
        &self,
        caller: &Caller,
        payload: CreateBulletinPayload,
    ) -> Result<Bulletin, AppError> {
        ensure(caller, Capability::PostBulletin)?;
        payload.validate()?;

        let bulletin = Bulletin {
            id: Uuid::new_v4(),
            tenant_id: caller.tenant_id,
            created_by: caller.user_id,
            title: payload.title.trim().to_string(),
            content: payload.content.trim().to_string(),
            date: payload.date,
            urgent: payload.urgent,
            source_event_id: None,
            created_at: Utc::now(),
        };
        let bulletin = self.bulletins.put(bulletin).await?;

        tracing::info!(tenant_id = %caller.tenant_id, bulletin_id = %bulletin.id, urgent = bulletin.urgent, "Aviso publicado");
        Ok(bulletin)
    }

    pub async fn delete_bulletin(&self, caller: &Caller, bulletin_id: Uuid) -> Result<(), AppError> {
        ensure(caller, Capability::PostBulletin)?;
        let _guard = self.mirror_lock.lock().await;

        let bulletin = self
            .bulletins
            .get_scoped(&caller.scope(), bulletin_id)
            .await?
            .ok_or(AppError::NotFound("aviso"))?;
        self.bulletins.delete(bulletin.id).await?;

        tracing::info!(tenant_id = %caller.tenant_id, bulletin_id = %bulletin.id, "Aviso removido");
        Ok(())
    }
}

fn ensure(caller: &Caller, capability: Capability) -> Result<(), AppError> {
    if can_access(caller.role, capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(capability.slug()))
    }
}
