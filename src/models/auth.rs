// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{Record, Scope},
    models::{
        lifecycle::{AccountStatus, Lifecycle},
        rbac::Role,
        tenancy::Tenant,
    },
};

// Representa um usuário como fica guardado no repositório
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    // Hash bcrypt; nunca sai pela API (ver `PublicUser`)
    pub password_hash: String,
    // `None` apenas para o superadmin
    pub tenant_id: Option<Uuid>,
    pub job_title: String,
    pub role: Role,
    pub status: AccountStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }

    fn is_consistent(&self) -> bool {
        let tenant_ok = self.role == Role::Superadmin || self.tenant_id.is_some();
        tenant_ok && self.active == (self.status == AccountStatus::Active)
    }
}

impl Lifecycle for User {
    fn status(&self) -> AccountStatus {
        self.status
    }

    fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        self.active = status == AccountStatus::Active;
        self.updated_at = now;
    }
}

// O usuário como sai da API: sem o hash da senha.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    #[schema(example = "Gestor Municipal")]
    pub name: String,
    #[schema(example = "gestor@exemplo.com")]
    pub email: String,
    pub tenant_id: Option<Uuid>,
    #[schema(example = "Secretário de Educação")]
    pub job_title: String,
    pub role: Role,
    pub status: AccountStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            tenant_id: user.tenant_id,
            job_title: user.job_title.clone(),
            role: user.role,
            status: user.status,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser::from(&user)
    }
}

/// Quem está agindo numa rota com contexto de secretaria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Uuid,
}

impl Caller {
    pub fn scope(&self) -> Scope {
        Scope::new(self.tenant_id, self.user_id)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

// Dados para login. Campos ausentes viram vazios e são recusados pelo serviço.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginUserPayload {
    #[serde(default)]
    #[schema(example = "gestor@exemplo.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// Cadastro: uma secretaria e o seu gestor, pendentes até a aprovação.
// Os nomes em português do formulário de cadastro também são aceitos.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[serde(default, alias = "nomeSecretaria")]
    #[validate(length(min = 1, message = "O nome da secretaria é obrigatório."))]
    #[schema(example = "Secretaria Municipal de Educação de Nova Cidade")]
    pub tenant_name: String,

    #[serde(default, alias = "municipio")]
    #[validate(length(min = 1, message = "O município é obrigatório."))]
    #[schema(example = "Nova Cidade")]
    pub municipality: String,

    #[serde(default, alias = "estado")]
    #[validate(length(equal = 2, message = "Informe a UF com 2 letras."))]
    #[schema(example = "MG")]
    pub state: String,

    #[serde(default, alias = "endereco")]
    pub address: Option<String>,

    #[serde(default, alias = "telefone")]
    pub phone: Option<String>,

    #[serde(default, alias = "nomeGestor")]
    #[validate(length(min = 1, message = "O nome do gestor é obrigatório."))]
    #[schema(example = "Maria Souza")]
    pub manager_name: String,

    #[serde(default)]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@novacidade.mg.gov.br")]
    pub email: String,

    #[serde(default, alias = "cargo")]
    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    #[schema(example = "Secretária de Educação")]
    pub job_title: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetPayload {
    #[serde(default)]
    #[schema(example = "gestor@exemplo.com")]
    pub email: String,
}

// Edição de perfil; a troca de senha é opcional.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[serde(default)]
    pub job_title: Option<String>,

    pub current_password: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: Option<String>,

    pub confirm_password: Option<String>,
}

// Resposta do login: o token também vai no cookie HTTP-only
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: PublicUser,
    pub tenant: Option<Tenant>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: PublicUser,
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub email: String,
    pub tenant_id: Option<Uuid>,
    pub role: Role,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Gestor".into(),
            email: "gestor@exemplo.com".into(),
            password_hash: "$2b$04$hash".into(),
            tenant_id: Some(Uuid::new_v4()),
            job_title: "Secretário".into(),
            role: Role::Gestor,
            status: AccountStatus::Active,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_strips_password_hash() {
        let json = serde_json::to_value(PublicUser::from(user())).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "gestor");
    }

    #[test]
    fn non_superadmin_without_tenant_is_inconsistent() {
        let mut orphan = user();
        orphan.tenant_id = None;
        assert!(!orphan.is_consistent());

        orphan.role = Role::Superadmin;
        assert!(orphan.is_consistent());
    }

    #[test]
    fn signup_accepts_portuguese_field_names() {
        let payload: SignupPayload = serde_json::from_value(serde_json::json!({
            "nomeSecretaria": "SME Nova Cidade",
            "municipio": "Nova Cidade",
            "estado": "MG",
            "nomeGestor": "Maria",
            "email": "maria@novacidade.gov.br",
            "cargo": "Secretária",
            "password": "segredo123"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.tenant_name, "SME Nova Cidade");
    }

    #[test]
    fn signup_missing_fields_fail_validation() {
        let payload: SignupPayload = serde_json::from_value(serde_json::json!({
            "email": "maria@novacidade.gov.br"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("tenant_name"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
