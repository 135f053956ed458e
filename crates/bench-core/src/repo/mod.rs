//! Repositorio de documentos de pipeline.
//!
//! El almacenamiento real es un colaborador externo; el core sólo define el
//! contrato (`PipelineRepository`) y una implementación en memoria usada por
//! tests y por la CLI. Semántica last-writer-wins: no hay control de
//! concurrencia optimista.

pub mod types;

pub use types::{DocumentSummary, InMemoryPipelineRepository, PipelineRepository, RepositoryError};
