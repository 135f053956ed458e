//! Pivotado de mediciones en filas alineadas por instante para gráficos de
//! tendencia.
//!
//! Cada fila lleva el timestamp y una clave por serie presente en ese
//! instante (`<sujeto>_score`, `<sujeto>_lat`, `<sujeto>_tps`). Las filas
//! son dispersas: una serie sin medición en un instante simplemente no
//! aparece, nunca se rellena con 0 ni null.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use bench_core::StepTypeTag;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::record::{MeasurementRecord, Timestamp};

pub const SCORE_SUFFIX: &str = "_score";
pub const LATENCY_SUFFIX: &str = "_lat";
pub const THROUGHPUT_SUFFIX: &str = "_tps";
/// Ancho mínimo (en %) con el que se dibuja un segmento.
pub const SEGMENT_DISPLAY_FLOOR: f64 = 5.0;

const ALL_DATASETS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatasetFilter {
    #[default]
    All,
    Label(String),
}

impl DatasetFilter {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            DatasetFilter::All => true,
            DatasetFilter::Label(l) => l == label,
        }
    }
}

impl From<String> for DatasetFilter {
    fn from(s: String) -> Self {
        if s == ALL_DATASETS {
            DatasetFilter::All
        } else {
            DatasetFilter::Label(s)
        }
    }
}

impl From<DatasetFilter> for String {
    fn from(f: DatasetFilter) -> Self {
        match f {
            DatasetFilter::All => ALL_DATASETS.to_string(),
            DatasetFilter::Label(l) => l,
        }
    }
}

impl FromStr for DatasetFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DatasetFilter::from(s.to_string()))
    }
}

/// Predicados de filtrado. Un conjunto de sujetos vacío significa "todos".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesFilter {
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default)]
    pub dataset: DatasetFilter,
}

impl SeriesFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dataset(mut self, dataset: DatasetFilter) -> Self {
        self.dataset = dataset;
        self
    }

    fn keeps_subject(&self, subject_id: &str) -> bool {
        self.subjects.is_empty() || self.subjects.contains(subject_id)
    }

    pub fn keeps(&self, record: &MeasurementRecord) -> bool {
        self.keeps_subject(&record.subject_id) && self.dataset.matches(&record.dataset_label)
    }
}

/// Una fila del gráfico: timestamp + valores presentes en ese instante.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

impl SeriesRow {
    fn seed(timestamp: Timestamp) -> Self {
        Self { timestamp,
               values: IndexMap::new() }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    // Las claves sólo se agregan; la primera medición del instante gana.
    fn add(&mut self, key: String, value: f64) {
        self.values.entry(key).or_insert(value);
    }
}

/// Filtra, ordena (estable) por instante y pivota a filas.
pub fn aggregate(records: &[MeasurementRecord], filter: &SeriesFilter) -> Vec<SeriesRow> {
    if records.is_empty() {
        warn!("aggregate: empty input");
    }
    let mut kept: Vec<&MeasurementRecord> = records.iter().filter(|r| filter.keeps(r)).collect();
    kept.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut rows: IndexMap<DateTime<Utc>, SeriesRow> = IndexMap::new();
    for r in kept {
        let row = rows.entry(r.timestamp.instant())
                      .or_insert_with(|| SeriesRow::seed(r.timestamp.clone()));
        if let Some(score) = r.score_value {
            row.add(format!("{}{SCORE_SUFFIX}", r.subject_id), score);
        }
        row.add(format!("{}{LATENCY_SUFFIX}", r.subject_id), r.latency_ms);
        if let Some(tps) = r.throughput_tok_per_sec {
            row.add(format!("{}{THROUGHPUT_SUFFIX}", r.subject_id), tps);
        }
    }
    debug!("aggregate: {} records -> {} rows", records.len(), rows.len());
    rows.into_values().collect()
}

/// Estadísticas de cabecera del panel de tendencias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub record_count: usize,
    pub mean_throughput: Option<f64>,
    pub peak_throughput: Option<f64>,
    pub mean_latency: f64,
}

/// Resume las mediciones de los sujetos elegidos (sin filtro de dataset).
pub fn summarize(records: &[MeasurementRecord], subjects: &BTreeSet<String>) -> Result<Summary, AnalyticsError> {
    let filter = SeriesFilter { subjects: subjects.clone(),
                                dataset: DatasetFilter::All };
    let kept: Vec<&MeasurementRecord> = records.iter().filter(|r| filter.keeps(r)).collect();
    if kept.is_empty() {
        return Err(AnalyticsError::NoRecords);
    }
    let tps: Vec<f64> = kept.iter().filter_map(|r| r.throughput_tok_per_sec).collect();
    let mean_throughput = (!tps.is_empty()).then(|| tps.iter().sum::<f64>() / tps.len() as f64);
    let peak_throughput = tps.iter().copied().reduce(f64::max);
    let mean_latency = kept.iter().map(|r| r.latency_ms).sum::<f64>() / kept.len() as f64;
    Ok(Summary { record_count: kept.len(),
                 mean_throughput,
                 peak_throughput,
                 mean_latency })
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for l in labels {
        if !out.iter().any(|seen| seen == l) {
            out.push(l.to_string());
        }
    }
    out
}

/// Datasets presentes, en orden de primera aparición.
pub fn datasets(records: &[MeasurementRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.dataset_label.as_str()))
}

/// Sujetos presentes, en orden de primera aparición.
pub fn subjects(records: &[MeasurementRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.subject_id.as_str()))
}

/// Participación de un step en la latencia total de la corrida.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentShare {
    pub step_id: String,
    pub step_name: String,
    pub type_tag: StepTypeTag,
    pub duration_ms: f64,
    pub percent: f64,
    /// `percent` con piso `SEGMENT_DISPLAY_FLOOR` para que se vea.
    pub display_percent: f64,
}

/// Desglose por step. Vacío si el registro no trae segmentos.
pub fn segment_breakdown(record: &MeasurementRecord) -> Vec<SegmentShare> {
    let Some(segments) = &record.segments else {
        return Vec::new();
    };
    segments.iter()
            .map(|s| {
                let percent = if record.latency_ms > 0.0 { s.duration_ms * 100.0 / record.latency_ms } else { 0.0 };
                SegmentShare { step_id: s.step_id.clone(),
                               step_name: s.step_name.clone(),
                               type_tag: s.type_tag,
                               duration_ms: s.duration_ms,
                               percent,
                               display_percent: percent.max(SEGMENT_DISPLAY_FLOOR) }
            })
            .collect()
}
