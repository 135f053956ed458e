//! Definiciones relacionadas a Steps.
//!
//! Un step es una etapa del pipeline de benchmark (embedding, retrieval,
//! generación...) o un `Phase` que agrupa substeps. Este módulo define:
//! - `StepTypeTag`: conjunto cerrado de tipos.
//! - `StepConfig`: configuración tipada, una variante por tag.
//! - `StepTypeRegistry`: esquema y defaults de cada tag.
//! - `PipelineStep` y `StepPatch`: el step del documento y sus ediciones.

pub mod config;
pub mod definition;
pub mod registry;
pub mod tag;

pub use config::{ClassificationConfig, CustomConfig, EmbeddingConfig, ExtractionConfig, GenerationConfig, PhaseConfig,
                 RerankConfig, RetrievalConfig, RoutingConfig, StepConfig, ToolCallingConfig};
pub use definition::{PipelineStep, StepId, StepPatch};
pub use registry::{FieldKind, FieldSpec, StepSchema, StepTypeRegistry};
pub use tag::StepTypeTag;
