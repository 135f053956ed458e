//! benchflow: definición de pipelines de benchmark y analítica de
//! resultados.
//!
//! Fachada sobre los crates del workspace:
//! - `pipeline` (`bench-core`): documentos de pipeline, registro de tipos de
//!   step, editor drag-and-drop y repositorio.
//! - `analytics` (`bench-analytics`): pesos de fusión, agregación de
//!   mediciones en series y comparación de métricas.

pub use bench_analytics as analytics;
pub use bench_core as pipeline;

pub use bench_analytics::{AnalyticsError, MeasurementRecord, SeriesFilter, SeriesRow, WeightedInput};
pub use bench_core::{default_document, CoreError, PipelineDocument, PipelineEditor, StepTypeTag};
