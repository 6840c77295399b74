// src/db/local_store.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{Record, Repository},
};

// Chaves do cache durável: um arquivo JSON (lista completa) por chave.
pub mod keys {
    pub const TENANTS: &str = "secretarias";
    pub const USERS: &str = "usuarios";
    pub const TICKETS: &str = "suporte-edu-chamados";
    pub const EVENTS: &str = "calendario-eventos";
    pub const BULLETINS: &str = "calendario-avisos";
    pub const DOCUMENTS: &str = "memorial-documentos";
    pub const CHATS: &str = "suporte-edu-chats";
    pub const ACTIVE_CHAT: &str = "suporte-edu-active-chat";
}

/// Lista em memória espelhada num cache JSON durável.
///
/// Toda mutação é aplicada primeiro em memória e, em seguida, a lista inteira é
/// regravada no arquivo da chave. Último a escrever vence, na granularidade da
/// lista inteira; não há merge por registro.
pub struct LocalStore<T> {
    key: &'static str,
    path: Option<PathBuf>,
    items: RwLock<Vec<T>>,
}

impl<T: Record> LocalStore<T> {
    /// Store sem arquivo (testes e execução sem `DATA_DIR`).
    pub fn in_memory(key: &'static str) -> Self {
        Self {
            key,
            path: None,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Abre (ou cria) o cache da chave dentro de `dir`.
    pub async fn open(dir: &Path, key: &'static str) -> Result<Self, AppError> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{key}.json"));

        let items = match fs::read_to_string(&path).await {
            Ok(raw) => parse_records::<T>(key, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!(key, path = %path.display(), records = items.len(), "Cache carregado");

        Ok(Self {
            key,
            path: Some(path),
            items: RwLock::new(items),
        })
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Aplica `f` sobre uma cópia da lista; se der certo, a cópia vira o estado
    /// atual e é persistida. Se `f` falhar, nada muda.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError> + Send,
        R: Send,
    {
        let mut items = self.items.write().await;
        let mut draft = items.clone();
        let result = f(&mut draft)?;
        *items = draft;
        self.persist(&items).await?;
        Ok(result)
    }

    async fn persist(&self, items: &[T]) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_vec(items)?;
        // Grava num temporário e renomeia, para nunca deixar um arquivo pela metade.
        let tmp = path.with_extension("json.tmp");
        let written = async {
            fs::write(&tmp, &json).await?;
            fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            tracing::error!(key = self.key, error = %e, "Falha ao persistir o cache");
            return Err(e.into());
        }

        debug!(key = self.key, records = items.len(), "Cache persistido");
        Ok(())
    }
}

/// Decodifica o arquivo registro a registro; registros malformados são ignorados.
fn parse_records<T: Record>(key: &str, raw: &str) -> Vec<T> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "Cache não é uma lista JSON; começando vazio");
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) if record.is_consistent() => records.push(record),
            Ok(_) => warn!(key, index, "Registro inconsistente ignorado"),
            Err(e) => warn!(key, index, error = %e, "Registro malformado ignorado"),
        }
    }
    records
}

#[async_trait]
impl<T: Record> Repository<T> for LocalStore<T> {
    async fn list(&self) -> Result<Vec<T>, AppError> {
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id() == id).cloned())
    }

    async fn put(&self, item: T) -> Result<T, AppError> {
        let stored = item.clone();
        self.mutate(move |items| {
            match items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
            Ok(())
        })
        .await?;
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.mutate(move |items| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            Ok(items.len() != before)
        })
        .await
    }
}
