//! bench-core: definición de pipelines de benchmark.
//!
//! Modelo tipado del documento (steps heterogéneos con configuración por
//! tipo), sus operaciones puras de edición, el editor interactivo
//! (drag-and-drop) y el contrato de repositorio. No ejecuta pipelines: sólo
//! prepara la configuración que consumiría un ejecutor externo.
pub mod constants;
pub mod document;
pub mod editor;
pub mod errors;
pub mod hashing;
pub mod merge;
pub mod repo;
pub mod step;

pub use document::template::default_document;
pub use document::{BackendKind, GlobalParameters, HardwareKind, PipelineDocument};
pub use editor::{DragPayload, DragState, PipelineEditor};
pub use errors::CoreError;
pub use repo::{DocumentSummary, InMemoryPipelineRepository, PipelineRepository, RepositoryError};
pub use step::{PipelineStep, StepConfig, StepId, StepPatch, StepSchema, StepTypeRegistry, StepTypeTag};
