// src/models/lifecycle.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::Record;

// Estado de aprovação, comum a Secretarias e Usuários.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Deactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Approve,
    Reject,
    Deactivate,
    Reactivate,
}

/// Resultado de uma transição válida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Becomes(AccountStatus),
    // Rejeição: o registro sai do sistema.
    Removed,
}

impl AccountStatus {
    /// Tabela de transições. `None` = ação não se aplica ao estado atual.
    pub fn apply(self, action: LifecycleAction) -> Option<Outcome> {
        use AccountStatus::*;
        use LifecycleAction::*;

        match (self, action) {
            (Pending, Approve) => Some(Outcome::Becomes(Active)),
            (Pending, Reject) => Some(Outcome::Removed),
            (Active, Deactivate) => Some(Outcome::Becomes(Deactivated)),
            (Deactivated, Reactivate) => Some(Outcome::Becomes(Active)),
            _ => None,
        }
    }
}

/// Entidades com ciclo de aprovação.
pub trait Lifecycle: Record {
    fn status(&self) -> AccountStatus;
    fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>);
}

// Filtro de listagem do painel (?status=pending)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub active: usize,
    pub deactivated: usize,
}

impl StatusCounts {
    pub fn tally<I: IntoIterator<Item = AccountStatus>>(statuses: I) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                AccountStatus::Pending => counts.pending += 1,
                AccountStatus::Active => counts.active += 1,
                AccountStatus::Deactivated => counts.deactivated += 1,
            }
        }
        counts
    }
}

// Resumo exibido no painel administrativo
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSummary {
    pub tenants: StatusCounts,
    pub users: StatusCounts,
}
