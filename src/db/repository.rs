// src/db/repository.rs

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::common::error::AppError;

/// Uma entidade persistível: identidade, dono e escopo de visibilidade.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Secretaria dona do registro (`None` só para o superadmin).
    fn tenant_id(&self) -> Option<Uuid>;

    fn owner_id(&self) -> Option<Uuid> {
        None
    }

    /// Registros privados só aparecem para o próprio dono.
    fn is_private(&self) -> bool {
        false
    }

    /// Invariantes internas; registros inconsistentes no cache são descartados na carga.
    fn is_consistent(&self) -> bool {
        true
    }
}

/// Quem está lendo: a secretaria e o usuário atuais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

impl Scope {
    pub fn new(tenant_id: Uuid, user_id: Uuid) -> Self {
        Self { tenant_id, user_id }
    }

    pub fn allows<T: Record>(&self, item: &T) -> bool {
        if item.tenant_id() != Some(self.tenant_id) {
            return false;
        }
        !item.is_private() || item.owner_id() == Some(self.user_id)
    }
}

// O "banco de dados" visto pelos serviços. Nenhum serviço conhece a tecnologia
// de armazenamento; trocar por um banco real é implementar esta trait.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError>;

    /// Insere ou substitui pelo `id`.
    async fn put(&self, item: T) -> Result<T, AppError>;

    /// Retorna `true` se havia um registro com esse `id`.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<T>, AppError> {
        let items = self.list().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.tenant_id() == Some(tenant_id))
            .collect())
    }

    /// Leitura escopada: secretaria atual e, para itens privados, o usuário atual.
    async fn load(&self, scope: &Scope) -> Result<Vec<T>, AppError> {
        let items = self.list().await?;
        Ok(items.into_iter().filter(|item| scope.allows(item)).collect())
    }

    /// Busca por `id` respeitando o escopo; fora dele o registro "não existe".
    async fn get_scoped(&self, scope: &Scope, id: Uuid) -> Result<Option<T>, AppError> {
        Ok(self.get(id).await?.filter(|item| scope.allows(item)))
    }
}
