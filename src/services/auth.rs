// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::{Claims, SignupPayload, UpdateProfilePayload, User},
        lifecycle::AccountStatus,
        rbac::{can_access, Capability, Role},
        tenancy::Tenant,
    },
};

/// Sessão recém-emitida pelo login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tenant: Option<Tenant>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn Repository<User>>,
    tenants: Arc<dyn Repository<Tenant>>,
    jwt_secret: String,
    session_ttl: Duration,
    bcrypt_cost: u32,
    // Serializa cadastro e troca de e-mail: a unicidade é verificada e gravada sob o mesmo lock.
    email_lock: Arc<Mutex<()>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        tenants: Arc<dyn Repository<Tenant>>,
        jwt_secret: String,
        session_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tenants,
            jwt_secret,
            session_ttl,
            bcrypt_cost,
            email_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---
    // Login / sessão
    // ---

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("password"));
        }

        // Só usuários ativos podem entrar
        let user = self
            .find_by_email(email)
            .await?
            .filter(|user| user.status == AccountStatus::Active)
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::info!(user_id = %user.id, "Login recusado: senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        let tenant = self.resolve_tenant(&user).await.inspect_err(|_| {
            tracing::info!(user_id = %user.id, "Login recusado: secretaria inativa");
        })?;

        let (token, expires_at) = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, role = ?user.role, "Login realizado");

        Ok(Session {
            user,
            tenant,
            token,
            expires_at,
        })
    }

    /// Valida o token e relê o usuário: contas desativadas depois da emissão caem aqui.
    pub async fn resolve_session(&self, token: &str) -> Result<(User, Option<Tenant>), AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::SessionInvalid)?;

        let user = self
            .users
            .get(token_data.claims.sub)
            .await?
            .filter(|user| user.status == AccountStatus::Active)
            .ok_or(AppError::UserNotFound)?;

        let tenant = self.resolve_tenant(&user).await?;
        Ok((user, tenant))
    }

    /// Secretaria do usuário. O superadmin nunca tem secretaria na sessão.
    pub async fn resolve_tenant(&self, user: &User) -> Result<Option<Tenant>, AppError> {
        if user.role == Role::Superadmin {
            return Ok(None);
        }

        let tenant_id = user.tenant_id.ok_or(AppError::TenantInactive)?;
        let tenant = self
            .tenants
            .get(tenant_id)
            .await?
            .filter(|tenant| tenant.status == AccountStatus::Active)
            .ok_or(AppError::TenantInactive)?;

        Ok(Some(tenant))
    }

    pub fn issue_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            tenant_id: user.tenant_id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok((token, expires_at))
    }

    // ---
    // Cadastro
    // ---

    /// Cria a secretaria e o gestor, ambos pendentes. Ou os dois existem no fim, ou nenhum.
    pub async fn signup(&self, payload: SignupPayload) -> Result<(Tenant, User), AppError> {
        payload.validate()?;

        let _guard = self.email_lock.lock().await;

        if self.email_taken(&payload.email, None).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = self.hash_password(&payload.password).await?;
        let now = Utc::now();

        let tenant = Tenant::pending(
            payload.tenant_name.trim().to_string(),
            payload.municipality.trim().to_string(),
            payload.state.trim().to_uppercase(),
            payload.address.filter(|s| !s.trim().is_empty()),
            payload.phone.filter(|s| !s.trim().is_empty()),
            now,
        );

        let user = User {
            id: Uuid::new_v4(),
            name: payload.manager_name.trim().to_string(),
            email: normalize_email(&payload.email),
            password_hash,
            tenant_id: Some(tenant.id),
            job_title: payload.job_title.trim().to_string(),
            role: Role::Gestor,
            status: AccountStatus::Pending,
            active: false,
            created_at: now,
            updated_at: now,
        };

        let tenant = self.tenants.put(tenant).await?;
        let user = match self.users.put(user).await {
            Ok(user) => user,
            Err(e) => {
                // Desfaz a metade já gravada
                if let Err(undo) = self.tenants.delete(tenant.id).await {
                    tracing::error!(tenant_id = %tenant.id, error = %undo, "Falha ao desfazer cadastro");
                }
                return Err(e);
            }
        };

        tracing::info!(tenant_id = %tenant.id, user_id = %user.id, "Cadastro recebido, aguardando aprovação");
        Ok((tenant, user))
    }

    /// Sempre responde com sucesso, exista ou não o e-mail.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        if email.trim().is_empty() {
            return Err(AppError::MissingField("email"));
        }

        let known = self.find_by_email(email).await?.is_some();
        tracing::info!("Pedido de recuperação de senha recebido");
        tracing::debug!(known, "Resultado da busca do pedido de recuperação");
        Ok(())
    }

    /// Cria o superadmin inicial se ainda não existir um usuário com esse e-mail.
    pub async fn bootstrap_superadmin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Option<User>, AppError> {
        let _guard = self.email_lock.lock().await;

        if self.email_taken(email, None).await? {
            return Ok(None);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: normalize_email(email),
            password_hash: self.hash_password(password).await?,
            tenant_id: None,
            job_title: "Super Administrador do Sistema".to_string(),
            role: Role::Superadmin,
            status: AccountStatus::Active,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.put(user).await?;
        tracing::info!(user_id = %user.id, "Superadmin inicial criado");
        Ok(Some(user))
    }

    // ---
    // Perfil
    // ---

    /// Edita o próprio perfil ou, com `edit-any-profile`, o de outro usuário.
    /// Trocar a própria senha exige a senha atual; a confirmação precisa bater.
    pub async fn update_profile(
        &self,
        actor: &User,
        target_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<User, AppError> {
        payload.validate()?;

        let editing_self = actor.id == target_id;
        if !editing_self && !can_access(actor.role, Capability::EditAnyProfile) {
            return Err(AppError::Forbidden(Capability::EditAnyProfile.slug()));
        }

        let _guard = self.email_lock.lock().await;

        let mut user = self
            .users
            .get(target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let email = normalize_email(&payload.email);
        if email != user.email && self.email_taken(&email, Some(user.id)).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        if let Some(new_password) = payload.new_password.as_deref().filter(|p| !p.is_empty()) {
            if payload.confirm_password.as_deref() != Some(new_password) {
                return Err(AppError::PasswordConfirmationMismatch);
            }
            if editing_self {
                let current = payload.current_password.as_deref().unwrap_or_default();
                if current.is_empty() || !self.verify_password(current, &user.password_hash).await? {
                    return Err(AppError::CurrentPasswordIncorrect);
                }
            }
            user.password_hash = self.hash_password(new_password).await?;
        }

        user.name = payload.name.trim().to_string();
        user.email = email;
        if let Some(job_title) = payload.job_title {
            user.job_title = job_title.trim().to_string();
        }
        user.updated_at = Utc::now();

        let user = self.users.put(user).await?;
        tracing::info!(actor_id = %actor.id, user_id = %user.id, "Perfil atualizado");
        Ok(user)
    }

    // ---
    // Auxiliares
    // ---

    pub async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        self.tenants.get(tenant_id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        let users = self.users.list().await?;
        Ok(users.into_iter().find(|user| user.email == email))
    }

    /// Unicidade global (todas as secretarias), ignorando maiúsculas e espaços.
    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let email = normalize_email(email);
        let users = self.users.list().await?;
        Ok(users
            .iter()
            .any(|user| user.email == email && Some(user.id) != except))
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password_clone = password.to_owned();
        let password_hash_clone = password_hash.to_owned();

        // Executa a verificação em um thread separado
        let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(is_valid)
    }
}
