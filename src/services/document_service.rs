// src/services/document_service.rs

use std::{cmp::Reverse, sync::Arc};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Repository,
    models::{
        auth::Caller,
        documents::{CreateDocumentPayload, Document, DocumentSearchQuery},
        rbac::{can_access, Capability},
    },
};

// Memorial de Gestão: acervo de documentos da secretaria
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn Repository<Document>>,
}

impl DocumentService {
    pub fn new(documents: Arc<dyn Repository<Document>>) -> Self {
        Self { documents }
    }

    pub async fn search(&self, caller: &Caller, query: &DocumentSearchQuery) -> Result<Vec<Document>, AppError> {
        let term = query.term.as_deref().unwrap_or_default();

        let mut documents: Vec<Document> = self
            .documents
            .load(&caller.scope())
            .await?
            .into_iter()
            .filter(|d| query.category.is_none_or(|c| d.category == c))
            .filter(|d| d.matches_term(term))
            .collect();
        documents.sort_by_key(|d| Reverse(d.created_at));
        Ok(documents)
    }

    pub async fn get(&self, caller: &Caller, document_id: Uuid) -> Result<Document, AppError> {
        self.documents
            .get_scoped(&caller.scope(), document_id)
            .await?
            .ok_or(AppError::NotFound("documento"))
    }

    pub async fn create(&self, caller: &Caller, payload: CreateDocumentPayload) -> Result<Document, AppError> {
        payload.validate()?;
        payload.content.check()?;

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            tenant_id: caller.tenant_id,
            created_by: caller.user_id,
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            category: payload.category,
            content: payload.content,
            tags: payload
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            created_at: now,
            updated_at: now,
        };

        let document = self.documents.put(document).await?;
        tracing::info!(tenant_id = %caller.tenant_id, document_id = %document.id, category = ?document.category, "Documento adicionado ao memorial");
        Ok(document)
    }

    /// Só quem criou ou a equipe de suporte pode apagar.
    pub async fn delete(&self, caller: &Caller, document_id: Uuid) -> Result<(), AppError> {
        let document = self.get(caller, document_id).await?;
        if document.created_by != caller.user_id && !can_access(caller.role, Capability::DeleteAnyDocument) {
            return Err(AppError::Forbidden(Capability::DeleteAnyDocument.slug()));
        }

        self.documents.delete(document.id).await?;
        tracing::info!(tenant_id = %caller.tenant_id, document_id = %document.id, "Documento removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{keys, LocalStore},
        models::{
            documents::{DocumentCategory, DocumentContent},
            rbac::Role,
        },
    };

    fn caller(role: Role, tenant_id: Uuid) -> Caller {
        Caller {
            user_id: Uuid::new_v4(),
            role,
            tenant_id,
        }
    }

    fn payload(title: &str, category: DocumentCategory, tags: &[&str]) -> CreateDocumentPayload {
        CreateDocumentPayload {
            title: title.into(),
            description: "Documento de referência".into(),
            category,
            content: DocumentContent::Text {
                content: "corpo".into(),
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(LocalStore::<Document>::in_memory(keys::DOCUMENTS)))
    }

    #[tokio::test]
    async fn search_by_category_and_term() {
        let svc = service();
        let gestor = caller(Role::Gestor, Uuid::new_v4());
        svc.create(&gestor, payload("Cardápio escolar", DocumentCategory::SchoolMeals, &["PNAE"]))
            .await
            .unwrap();
        svc.create(&gestor, payload("Rotas 2026", DocumentCategory::SchoolTransport, &[" ", "pnate"]))
            .await
            .unwrap();

        let meals = DocumentSearchQuery {
            category: Some(DocumentCategory::SchoolMeals),
            term: None,
        };
        assert_eq!(svc.search(&gestor, &meals).await.unwrap().len(), 1);

        let by_tag = DocumentSearchQuery {
            category: None,
            term: Some("PNATE".into()),
        };
        let found = svc.search(&gestor, &by_tag).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tags, vec!["pnate".to_string()]);
    }

    #[tokio::test]
    async fn documents_stay_in_their_tenant() {
        let svc = service();
        let mine = caller(Role::Gestor, Uuid::new_v4());
        let doc = svc
            .create(&mine, payload("Ata", DocumentCategory::Administrative, &[]))
            .await
            .unwrap();

        let outsider = caller(Role::Superadmin, Uuid::new_v4());
        assert!(svc.search(&outsider, &DocumentSearchQuery::default()).await.unwrap().is_empty());
        assert!(matches!(svc.delete(&outsider, doc.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn only_creator_or_staff_deletes() {
        let svc = service();
        let tenant = Uuid::new_v4();
        let author = caller(Role::Gestor, tenant);
        let doc = svc
            .create(&author, payload("PME", DocumentCategory::Pedagogical, &[]))
            .await
            .unwrap();

        let colleague = caller(Role::Usuario, tenant);
        assert!(matches!(
            svc.delete(&colleague, doc.id).await,
            Err(AppError::Forbidden("delete-any-document"))
        ));

        svc.delete(&caller(Role::Admin, tenant), doc.id).await.unwrap();
        assert!(matches!(svc.get(&author, doc.id).await, Err(AppError::NotFound(_))));
    }
}
