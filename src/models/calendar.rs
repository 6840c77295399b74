// src/models/calendar.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::db::Record;

// Namespace fixo dos avisos espelhados: o id do aviso é derivado do id do evento,
// então apagar o evento acha o aviso sem precisar de índice.
pub const MIRROR_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9d4b_4e8a_b7c1_52f0_8e3d_a914);

pub fn mirror_bulletin_id(event_id: Uuid) -> Uuid {
    Uuid::new_v5(&MIRROR_NAMESPACE, event_id.as_bytes())
}

// ---
// Evento do calendário
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub created_by: Uuid,
    #[schema(example = "Reunião do Conselho Municipal")]
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    // Pessoal: visível só para quem criou; oficial: vira aviso no mural.
    pub personal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn falls_on(&self, day: NaiveDate) -> bool {
        let start = self.start.date_naive();
        let end = self.end.date_naive();
        start <= day && day <= end
    }
}

impl Record for Event {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.created_by)
    }

    fn is_private(&self) -> bool {
        self.personal
    }

    fn is_consistent(&self) -> bool {
        self.end >= self.start
    }
}

// ---
// Aviso do mural
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bulletin {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub created_by: Uuid,
    #[schema(example = "Entrega do Censo Escolar")]
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub urgent: bool,
    // Preenchido quando o aviso é o espelho de um evento oficial
    pub source_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Bulletin {
    /// O aviso que espelha um evento oficial.
    pub fn mirror_of(event: &Event) -> Self {
        Self {
            id: mirror_bulletin_id(event.id),
            tenant_id: event.tenant_id,
            created_by: event.created_by,
            title: event.title.clone(),
            content: event.description.clone(),
            date: event.start,
            urgent: false,
            source_event_id: Some(event.id),
            created_at: event.created_at,
        }
    }
}

impl Record for Bulletin {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.created_by)
    }

    fn is_consistent(&self) -> bool {
        self.source_event_id
            .is_none_or(|event_id| self.id == mirror_bulletin_id(event_id))
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, alias = "isPersonal")]
    pub personal: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBulletinPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "O conteúdo é obrigatório."))]
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default, alias = "isUrgent")]
    pub urgent: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Só os eventos que ocorrem neste dia (YYYY-MM-DD).
    pub date: Option<NaiveDate>,
}
