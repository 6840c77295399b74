// src/services/lifecycle_service.rs

use std::{cmp::Reverse, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::User,
        lifecycle::{AccountStatus, ConsoleSummary, Lifecycle, LifecycleAction, Outcome, StatusCounts},
        rbac::{can_access, Capability, Role},
        tenancy::Tenant,
    },
};

/// Resultado de uma transição aplicada.
#[derive(Debug, Clone)]
pub enum Transitioned<T> {
    Updated(T),
    // Rejeição: o registro foi apagado.
    Removed(Uuid),
}

// Aprovação de secretarias e usuários. A política de acesso é conferida de novo aqui,
// independente do que a rota já verificou.
#[derive(Clone)]
pub struct LifecycleService {
    tenants: Arc<dyn Repository<Tenant>>,
    users: Arc<dyn Repository<User>>,
    // Leitura, checagem e escrita de uma transição acontecem sem intercalação.
    transition_lock: Arc<Mutex<()>>,
}

fn require(actor: &User, capability: Capability) -> Result<(), AppError> {
    if can_access(actor.role, capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(capability.slug()))
    }
}

/// Aplica `action` ao registro `id`. Aprovar ou rejeitar algo que já não está
/// pendente é tratado como "não encontrado" (pedido já resolvido).
async fn apply_transition<T: Lifecycle>(
    repo: &dyn Repository<T>,
    label: &'static str,
    id: Uuid,
    action: LifecycleAction,
) -> Result<Transitioned<T>, AppError> {
    let mut record = repo.get(id).await?.ok_or(AppError::NotFound(label))?;
    let from = record.status();

    match from.apply(action) {
        Some(Outcome::Becomes(status)) => {
            record.set_status(status, Utc::now());
            Ok(Transitioned::Updated(repo.put(record).await?))
        }
        Some(Outcome::Removed) => {
            repo.delete(id).await?;
            Ok(Transitioned::Removed(id))
        }
        None if matches!(action, LifecycleAction::Approve | LifecycleAction::Reject) => {
            Err(AppError::NotFound(label))
        }
        None => Err(AppError::InvalidTransition(format!("{from:?} -> {action:?}"))),
    }
}

impl LifecycleService {
    pub fn new(tenants: Arc<dyn Repository<Tenant>>, users: Arc<dyn Repository<User>>) -> Self {
        Self {
            tenants,
            users,
            transition_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---
    // Secretarias
    // ---

    pub async fn list_tenants(
        &self,
        actor: &User,
        status: Option<AccountStatus>,
    ) -> Result<Vec<Tenant>, AppError> {
        require(actor, Capability::ManageTenants)?;

        let mut tenants: Vec<Tenant> = self
            .tenants
            .list()
            .await?
            .into_iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect();
        tenants.sort_by_key(|t| Reverse(t.created_at));
        Ok(tenants)
    }

    pub async fn transition_tenant(
        &self,
        actor: &User,
        tenant_id: Uuid,
        action: LifecycleAction,
    ) -> Result<Transitioned<Tenant>, AppError> {
        require(actor, Capability::ManageTenants)?;
        let _guard = self.transition_lock.lock().await;

        // Sem a secretaria, os usuários dela ficariam órfãos: saem antes dela, para
        // que uma falha no meio nunca deixe usuário apontando para secretaria apagada.
        let removes_tenant = self
            .tenants
            .get(tenant_id)
            .await?
            .is_some_and(|tenant| matches!(tenant.status.apply(action), Some(Outcome::Removed)));
        if removes_tenant {
            for user in self.users.list_by_tenant(tenant_id).await? {
                self.users.delete(user.id).await?;
            }
        }

        let outcome = apply_transition(self.tenants.as_ref(), "secretaria", tenant_id, action).await?;

        tracing::info!(actor_id = %actor.id, tenant_id = %tenant_id, action = ?action, "Transição de secretaria");
        Ok(outcome)
    }

    // ---
    // Usuários
    // ---

    pub async fn list_users(
        &self,
        actor: &User,
        status: Option<AccountStatus>,
    ) -> Result<Vec<User>, AppError> {
        require(actor, Capability::ManageUsers)?;

        let mut users: Vec<User> = self
            .users
            .list()
            .await?
            .into_iter()
            .filter(|u| status.is_none_or(|s| u.status == s))
            .collect();
        users.sort_by_key(|u| Reverse(u.created_at));
        Ok(users)
    }

    pub async fn transition_user(
        &self,
        actor: &User,
        user_id: Uuid,
        action: LifecycleAction,
    ) -> Result<Transitioned<User>, AppError> {
        require(actor, Capability::ManageUsers)?;
        let _guard = self.transition_lock.lock().await;

        if let Some(target) = self.users.get(user_id).await? {
            ensure_can_manage(actor, &target)?;
        }

        let outcome = apply_transition(self.users.as_ref(), "usuário", user_id, action).await?;
        tracing::info!(actor_id = %actor.id, user_id = %user_id, action = ?action, "Transição de usuário");
        Ok(outcome)
    }

    /// Muda o nível de um usuário. Ninguém concede um nível acima do próprio.
    pub async fn change_user_role(
        &self,
        actor: &User,
        user_id: Uuid,
        role: Role,
    ) -> Result<User, AppError> {
        require(actor, Capability::ManageUsers)?;
        let _guard = self.transition_lock.lock().await;

        let mut target = self
            .users
            .get(user_id)
            .await?
            .ok_or(AppError::NotFound("usuário"))?;
        ensure_can_manage(actor, &target)?;

        if !actor.role.has_at_least(role) {
            return Err(AppError::Forbidden(Capability::ManageUsers.slug()));
        }
        if role != Role::Superadmin && target.tenant_id.is_none() {
            return Err(AppError::InvalidField {
                field: "role",
                reason: "tenant_required",
            });
        }

        let from = target.role;
        target.role = role;
        target.updated_at = Utc::now();
        let target = self.users.put(target).await?;

        tracing::info!(actor_id = %actor.id, user_id = %user_id, from = ?from, to = ?role, "Nível de usuário alterado");
        Ok(target)
    }

    pub async fn summary(&self, actor: &User) -> Result<ConsoleSummary, AppError> {
        require(actor, Capability::ViewAdminConsole)?;

        let tenants = self.tenants.list().await?;
        let users = self.users.list().await?;
        Ok(ConsoleSummary {
            tenants: StatusCounts::tally(tenants.iter().map(|t| t.status)),
            users: StatusCounts::tally(users.iter().map(|u| u.status)),
        })
    }
}

/// Ninguém altera a própria conta pelo painel nem mexe em quem está acima de si.
fn ensure_can_manage(actor: &User, target: &User) -> Result<(), AppError> {
    if actor.id == target.id || !actor.role.has_at_least(target.role) {
        return Err(AppError::Forbidden(Capability::ManageUsers.slug()));
    }
    Ok(())
}
