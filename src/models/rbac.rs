// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---
// 1. Role (Nível de Permissão)
// ---
// A ordem de declaração é a ordem de privilégio:
// usuario < gestor < admin < superadmin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Usuario,
    Gestor,
    Admin,
    Superadmin,
}

impl Role {
    pub fn has_at_least(self, required: Role) -> bool {
        has_at_least(self, required)
    }

    /// Equipe de suporte (admin e superadmin).
    pub fn is_staff(self) -> bool {
        self >= Role::Admin
    }
}

pub fn has_at_least(role: Role, required: Role) -> bool {
    role >= required
}

// ---
// 2. Capability (Ações protegidas)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ViewAdminConsole,
    ManageTenants,
    ManageUsers,
    EditOwnTicketStatus,
    CloseTicket,
    PostBulletin,
    DeleteAnyDocument,
    EditAnyProfile,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::ViewAdminConsole,
        Capability::ManageTenants,
        Capability::ManageUsers,
        Capability::EditOwnTicketStatus,
        Capability::CloseTicket,
        Capability::PostBulletin,
        Capability::DeleteAnyDocument,
        Capability::EditAnyProfile,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Capability::ViewAdminConsole => "view-admin-console",
            Capability::ManageTenants => "manage-tenants",
            Capability::ManageUsers => "manage-users",
            Capability::EditOwnTicketStatus => "edit-own-ticket-status",
            Capability::CloseTicket => "close-ticket",
            Capability::PostBulletin => "post-bulletin",
            Capability::DeleteAnyDocument => "delete-any-document",
            Capability::EditAnyProfile => "edit-any-profile",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Menor nível que recebe a capacidade.
    fn minimum_role(self) -> Role {
        match self {
            Capability::ViewAdminConsole
            | Capability::ManageTenants
            | Capability::ManageUsers
            | Capability::EditOwnTicketStatus
            | Capability::CloseTicket
            | Capability::PostBulletin
            | Capability::DeleteAnyDocument => Role::Admin,
            Capability::EditAnyProfile => Role::Superadmin,
        }
    }
}

/// Política de acesso pura: nenhuma E/S, consultada nas rotas e de novo nos serviços.
pub fn can_access(role: Role, capability: Capability) -> bool {
    has_at_least(role, capability.minimum_role())
}

/// Variante por slug; qualquer slug desconhecido é negado.
pub fn can_access_slug(role: Role, slug: &str) -> bool {
    Capability::from_slug(slug).is_some_and(|capability| can_access(role, capability))
}

// Troca de nível de um usuário (painel administrativo)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeRolePayload {
    pub role: Role,
}

// Capacidades do usuário atual, para a interface esconder o que ele não pode usar
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CapabilityList {
    pub role: Role,
    pub capabilities: Vec<Capability>,
}

impl CapabilityList {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            capabilities: Capability::ALL
                .into_iter()
                .filter(|capability| can_access(role, *capability))
                .collect(),
        }
    }
}
