//! bench-analytics: núcleo analítico de resultados de benchmark.
//!
//! - `weights`: normalización e integridad de pesos de fusión.
//! - `record`: registros de medición y timestamps con orden total.
//! - `aggregate`: pivotado a filas de series temporales y resúmenes.
//! - `compare`: comparación direccional de métricas.
//!
//! Todo es síncrono y puro: entra un valor, sale otro.
pub mod aggregate;
pub mod compare;
pub mod error;
pub mod record;
pub mod weights;

pub use aggregate::{aggregate, datasets, segment_breakdown, subjects, summarize, DatasetFilter, SegmentShare, SeriesFilter, SeriesRow, Summary};
pub use compare::{compare, compare_sets, Direction, MetricDelta, MetricKind, MetricSet};
pub use error::AnalyticsError;
pub use record::{MeasurementRecord, Segment, Timestamp};
pub use weights::{check_integrity, equal_weights, normalize, IntegrityReport, Weight, WeightedInput, WEIGHT_TOLERANCE};
