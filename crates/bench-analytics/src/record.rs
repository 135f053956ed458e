//! Registros de medición tal como llegan del almacenamiento de resultados.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bench_core::StepTypeTag;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AnalyticsError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Instante de una medición. Se ordena por el instante parseado, no por el
/// texto; la etiqueta original se conserva para la salida.
#[derive(Debug, Clone)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    label: String,
}

impl Timestamp {
    /// Acepta RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` y
    /// `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn parse(raw: &str) -> Result<Self, AnalyticsError> {
        let text = raw.trim();
        let instant = DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
                                                        .ok()
                                                        .or_else(|| {
                                                            NAIVE_FORMATS.iter()
                                                                         .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                                                                         .map(|n| n.and_utc())
                                                        })
                                                        .or_else(|| {
                                                            NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
                                                                                                       .and_then(|d| d.and_hms_opt(0, 0, 0))
                                                                                                       .map(|n| n.and_utc())
                                                        })
                                                        .ok_or_else(|| AnalyticsError::InvalidTimestamp(raw.to_string()))?;
        Ok(Self { instant,
                  label: raw.to_string() })
    }

    /// Epoch en milisegundos.
    pub fn from_millis(ms: i64) -> Result<Self, AnalyticsError> {
        let instant = Utc.timestamp_millis_opt(ms)
                         .single()
                         .ok_or_else(|| AnalyticsError::InvalidTimestamp(ms.to_string()))?;
        Ok(Self { instant,
                  label: ms.to_string() })
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl FromStr for Timestamp {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// Dos etiquetas distintas del mismo instante son la misma fila.
impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string or an epoch in milliseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Timestamp, E> {
        Timestamp::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Timestamp, E> {
        Timestamp::from_millis(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Timestamp, E> {
        let ms = i64::try_from(v).map_err(|_| E::custom(AnalyticsError::InvalidTimestamp(v.to_string())))?;
        Timestamp::from_millis(ms).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// Duración de un step dentro de una corrida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub step_id: String,
    pub step_name: String,
    pub type_tag: StepTypeTag,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Una medición inmutable de un sujeto (modelo) sobre un dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject_id: String,
    pub variant_id: String,
    pub dataset_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_value: Option<f64>,
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_tok_per_sec: Option<f64>,
    pub timestamp: Timestamp,
    pub hardware_kind: String,
    pub hardware_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}

impl MeasurementRecord {
    /// Registro mínimo; el resto de campos se completa con asignación
    /// directa.
    pub fn new(subject_id: impl Into<String>, dataset_label: impl Into<String>, timestamp: Timestamp, latency_ms: f64) -> Self {
        Self { id: None,
               subject_id: subject_id.into(),
               variant_id: String::new(),
               dataset_label: dataset_label.into(),
               score_value: None,
               latency_ms,
               throughput_tok_per_sec: None,
               timestamp,
               hardware_kind: String::new(),
               hardware_label: String::new(),
               metric: None,
               notes: None,
               segments: None }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score_value = Some(score);
        self
    }

    pub fn with_throughput(mut self, tps: f64) -> Self {
        self.throughput_tok_per_sec = Some(tps);
        self
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = Some(segments);
        self
    }
}
