// src/models/documents.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, db::Record};

// As seis áreas do Memorial de Gestão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DocumentCategory {
    #[serde(rename = "administrativa")]
    Administrative,
    #[serde(rename = "pedagogica")]
    Pedagogical,
    #[serde(rename = "orcamentaria")]
    Budget,
    #[serde(rename = "alimentacao")]
    SchoolMeals,
    #[serde(rename = "transporte")]
    SchoolTransport,
    #[serde(rename = "programas")]
    Programs,
}

/// Conteúdo do documento: texto inline ou metadados de um arquivo, nunca os dois.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentContent {
    Text {
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    File {
        file_name: String,
        file_size: u64,
        mime_type: String,
        location: String,
    },
}

impl DocumentContent {
    pub fn check(&self) -> Result<(), AppError> {
        match self {
            DocumentContent::Text { content } if content.trim().is_empty() => {
                Err(AppError::InvalidField {
                    field: "content",
                    reason: "empty",
                })
            }
            DocumentContent::File { file_name, .. } if file_name.trim().is_empty() => {
                Err(AppError::InvalidField {
                    field: "fileName",
                    reason: "empty",
                })
            }
            DocumentContent::File { location, .. } if location.trim().is_empty() => {
                Err(AppError::InvalidField {
                    field: "location",
                    reason: "empty",
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub created_by: Uuid,
    #[schema(example = "Plano Municipal de Educação 2025")]
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
    pub content: DocumentContent,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Busca sem diferenciar maiúsculas: título (a frase inteira, ou cada palavra
    /// da busca em qualquer ordem), descrição e tags.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let title = self.title.to_lowercase();
        title.contains(&term)
            || term.split_whitespace().all(|word| title.contains(word))
            || self.description.to_lowercase().contains(&term)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }
}

impl Record for Document {
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
        self.content.check().is_ok()
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: DocumentCategory,
    pub content: DocumentContent,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentSearchQuery {
    pub category: Option<DocumentCategory>,
    /// Termo de busca (título, descrição ou tags).
    #[serde(alias = "q")]
    pub term: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: "Relatório do Transporte Escolar".into(),
            description: "Rotas atendidas no primeiro semestre".into(),
            category: DocumentCategory::SchoolTransport,
            content: DocumentContent::Text {
                content: "...".into(),
            },
            tags: vec!["PNATE".into(), "rotas".into()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let doc = document();
        assert!(doc.matches_term("transporte"));
        assert!(doc.matches_term("SEMESTRE"));
        assert!(doc.matches_term("pnate"));
        assert!(!doc.matches_term("merenda"));
        assert!(doc.matches_term("  "));
    }

    #[test]
    fn every_word_of_the_search_must_be_in_the_title() {
        let doc = document();
        assert!(doc.matches_term("escolar relatório"));
        assert!(doc.matches_term("TRANSPORTE   relatório"));
        assert!(!doc.matches_term("relatório merenda"));
    }

    #[test]
    fn content_is_tagged_by_kind() {
        let json = serde_json::to_value(document()).unwrap();
        assert_eq!(json["content"]["kind"], "text");
        assert_eq!(json["category"], "transporte");

        let file: DocumentContent = serde_json::from_value(serde_json::json!({
            "kind": "file",
            "fileName": "ata.pdf",
            "fileSize": 1024,
            "mimeType": "application/pdf",
            "location": "memorial/ata.pdf"
        }))
        .unwrap();
        assert!(file.check().is_ok());
    }

    #[test]
    fn empty_text_content_is_rejected() {
        let content = DocumentContent::Text { content: " ".into() };
        assert!(matches!(
            content.check(),
            Err(AppError::InvalidField { field: "content", .. })
        ));
    }
}
