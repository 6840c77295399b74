// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::Record,
    models::lifecycle::{AccountStatus, Lifecycle},
};

// ---
// Tenant (A "Secretaria")
// ---
// Secretaria municipal de educação: a fronteira de multi-tenancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Secretaria Municipal de Educação de Exemplo")]
    pub name: String,
    #[schema(example = "Exemplo")]
    pub municipality: String,
    #[schema(example = "SP")]
    pub state: String,
    #[schema(example = "Rua Exemplo, 123")]
    pub address: Option<String>,
    #[schema(example = "(11) 1234-5678")]
    pub phone: Option<String>,
    pub status: AccountStatus,
    // Espelho de `status == Active`, mantido por `set_status`.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Nova secretaria vinda do cadastro: sempre pendente.
    pub fn pending(
        name: String,
        municipality: String,
        state: String,
        address: Option<String>,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            municipality,
            state,
            address,
            phone,
            status: AccountStatus::Pending,
            active: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Tenant {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn is_consistent(&self) -> bool {
        self.active == (self.status == AccountStatus::Active)
    }
}

impl Lifecycle for Tenant {
    fn status(&self) -> AccountStatus {
        self.status
    }

    fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        self.active = status == AccountStatus::Active;
        self.updated_at = now;
    }
}
