use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::DOCUMENT_ID_PREFIX;
use crate::document::PipelineDocument;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RepositoryError {
    #[error("document not found: {0}")]
    NotFound(String),
}

/// Resumen para listados (selector de "cargar configuración").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub step_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Contrato de persistencia de documentos.
pub trait PipelineRepository {
    /// Guarda el documento y devuelve la versión persistida. Un borrador
    /// recibe un id nuevo; un id existente se sobreescribe.
    fn save(&self, document: &PipelineDocument) -> PipelineDocument;
    /// Devuelve una copia independiente del documento guardado.
    fn load(&self, id: &str) -> Result<PipelineDocument, RepositoryError>;
    /// Borra el documento; `true` si existía. Borrar es irreversible.
    fn delete(&self, id: &str) -> bool;
    /// Documentos guardados, ordenados por nombre y luego id.
    fn list(&self) -> Vec<DocumentSummary>;
}

struct StoredDocument {
    document: PipelineDocument,
    saved_at: DateTime<Utc>,
}

/// Repositorio en memoria, compartible entre hilos.
#[derive(Default)]
pub struct InMemoryPipelineRepository {
    inner: DashMap<String, StoredDocument>,
}

impl InMemoryPipelineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl PipelineRepository for InMemoryPipelineRepository {
    fn save(&self, document: &PipelineDocument) -> PipelineDocument {
        let stored = if document.is_draft() {
            document.with_id(format!("{DOCUMENT_ID_PREFIX}{}", Uuid::new_v4().simple()))
        } else {
            document.clone()
        };
        debug!("repo: save {} ({} steps)", stored.id(), stored.len());
        self.inner.insert(stored.id().to_string(),
                          StoredDocument { document: stored.clone(),
                                           saved_at: Utc::now() });
        stored
    }

    fn load(&self, id: &str) -> Result<PipelineDocument, RepositoryError> {
        self.inner
            .get(id)
            .map(|entry| entry.document.clone())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> bool {
        let removed = self.inner.remove(id).is_some();
        if removed {
            debug!("repo: deleted {id}");
        }
        removed
    }

    fn list(&self) -> Vec<DocumentSummary> {
        let mut out: Vec<DocumentSummary> = self.inner
                                                .iter()
                                                .map(|entry| DocumentSummary { id: entry.key().clone(),
                                                                               name: entry.document.name().to_string(),
                                                                               step_count: entry.document.len(),
                                                                               saved_at: entry.saved_at })
                                                .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::template::default_document;
    use crate::step::StepTypeTag;

    #[test]
    fn saving_a_draft_assigns_an_id() {
        let repo = InMemoryPipelineRepository::new();
        let saved = repo.save(&default_document());
        assert!(saved.id().starts_with(DOCUMENT_ID_PREFIX));
        assert!(!saved.is_draft());
        assert_eq!(repo.load(saved.id()).unwrap(), saved);
    }

    #[test]
    fn saving_existing_id_overwrites() {
        let repo = InMemoryPipelineRepository::new();
        let saved = repo.save(&default_document());
        let edited = saved.insert_step(StepTypeTag::Generation, None);
        let again = repo.save(&edited);
        assert_eq!(again.id(), saved.id());
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.load(saved.id()).unwrap().len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let repo = InMemoryPipelineRepository::new();
        let saved = repo.save(&default_document());
        assert!(repo.delete(saved.id()));
        assert!(!repo.delete(saved.id()));
        assert_eq!(repo.load(saved.id()).unwrap_err(), RepositoryError::NotFound(saved.id().to_string()));
    }

    #[test]
    fn list_is_sorted_by_name() {
        let repo = InMemoryPipelineRepository::new();
        repo.save(&default_document().with_name("zeta"));
        repo.save(&default_document().with_name("alpha"));
        let names: Vec<String> = repo.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
