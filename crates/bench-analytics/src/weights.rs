//! Integridad de pesos para configuraciones de fusión de modelos.
//!
//! Un grupo de `WeightedInput` es válido cuando sus pesos suman 1.0 (con
//! tolerancia `WEIGHT_TOLERANCE`). Un peso en blanco cuenta como 0 al sumar
//! pero se conserva en blanco: nunca se reescribe como "0".

use std::fmt;

use log::warn;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AnalyticsError;

pub const WEIGHT_TOLERANCE: f64 = 1e-3;
const WEIGHT_SCALE: f64 = 1e4;

/// Peso editable: un número finito o blanco.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Weight(Option<f64>);

impl Weight {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Weight(Some(value))
        } else {
            Weight(None)
        }
    }

    pub fn blank() -> Self {
        Weight(None)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_none()
    }

    /// Valor usado al sumar.
    pub fn or_zero(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Weight::new(value)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }
}

struct WeightVisitor;

impl<'de> Visitor<'de> for WeightVisitor {
    type Value = Weight;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, blank or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Weight, E> {
        Ok(Weight::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Weight, E> {
        Ok(Weight::new(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Weight, E> {
        Ok(Weight::new(v as f64))
    }

    // Lo que el usuario tipeó: "0.5" se lee, "" o "abc" quedan en blanco.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Weight, E> {
        Ok(v.trim().parse::<f64>().map(Weight::new).unwrap_or_default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Weight, E> {
        Ok(Weight::blank())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Weight, E> {
        Ok(Weight::blank())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Weight, D::Error> {
        deserializer.deserialize_any(WeightVisitor)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WeightVisitor)
    }
}

/// Una contribución (p.ej. un modelo fuente) a una fusión.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedInput {
    pub slot_id: String,
    #[serde(default)]
    pub target_ref: Option<String>,
    #[serde(default)]
    pub weight: Weight,
}

impl WeightedInput {
    pub fn new(slot_id: impl Into<String>, target_ref: Option<String>, weight: impl Into<Weight>) -> Self {
        Self { slot_id: slot_id.into(),
               target_ref,
               weight: weight.into() }
    }
}

/// Resultado informativo de `check_integrity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub passing: bool,
    pub total: f64,
    /// Slots en blanco que se sumaron como 0.
    pub defaulted: Vec<String>,
}

fn total(inputs: &[WeightedInput]) -> f64 {
    inputs.iter().map(|i| i.weight.or_zero()).sum()
}

fn defaulted(inputs: &[WeightedInput]) -> Vec<String> {
    inputs.iter()
          .filter(|i| i.weight.is_blank())
          .map(|i| i.slot_id.clone())
          .collect()
}

// Redondea cada parte a 1/WEIGHT_SCALE y carga el residuo en el slot de
// mayor magnitud (el primero si empatan): la suma queda exactamente en 1.
fn balance(shares: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut units: Vec<Option<i64>> = shares.iter()
                                            .map(|s| s.map(|w| (w * WEIGHT_SCALE).round() as i64))
                                            .collect();
    let residual = WEIGHT_SCALE as i64 - units.iter().flatten().sum::<i64>();
    let mut largest: Option<(usize, i64)> = None;
    for (n, u) in units.iter().enumerate() {
        if let Some(u) = *u {
            if largest.map_or(true, |(_, best)| u.abs() > best.abs()) {
                largest = Some((n, u));
            }
        }
    }
    if let Some((n, _)) = largest {
        if let Some(slot) = units[n].as_mut() {
            *slot += residual;
        }
    }
    units.into_iter().map(|u| u.map(|u| u as f64 / WEIGHT_SCALE)).collect()
}

/// Reescala los pesos para que sumen exactamente 1 con 4 decimales. Los
/// blancos siguen en blanco. Volver a normalizar el resultado no lo cambia.
pub fn normalize(inputs: &[WeightedInput]) -> Result<Vec<WeightedInput>, AnalyticsError> {
    let sum = total(inputs);
    if sum == 0.0 || !sum.is_finite() {
        return Err(AnalyticsError::ZeroTotalWeight);
    }
    let blanks = defaulted(inputs);
    if !blanks.is_empty() {
        warn!("weights: blank slots counted as 0: {}", blanks.join(", "));
    }
    let shares: Vec<Option<f64>> = inputs.iter().map(|i| i.weight.value().map(|w| w / sum)).collect();
    Ok(inputs.iter()
             .zip(balance(&shares))
             .map(|(i, w)| WeightedInput { weight: Weight(w), ..i.clone() })
             .collect())
}

/// `passing` sii `|total - 1| < WEIGHT_TOLERANCE`. No muta nada.
pub fn check_integrity(inputs: &[WeightedInput]) -> IntegrityReport {
    let sum = total(inputs);
    IntegrityReport { passing: (sum - 1.0).abs() < WEIGHT_TOLERANCE,
                      total: sum,
                      defaulted: defaulted(inputs) }
}

/// Reparte el peso en partes iguales (estado inicial de un grupo).
pub fn equal_weights(inputs: &[WeightedInput]) -> Result<Vec<WeightedInput>, AnalyticsError> {
    if inputs.is_empty() {
        return Err(AnalyticsError::ZeroTotalWeight);
    }
    let shares = vec![Some(1.0 / inputs.len() as f64); inputs.len()];
    Ok(inputs.iter()
             .zip(balance(&shares))
             .map(|(i, w)| WeightedInput { weight: Weight(w), ..i.clone() })
             .collect())
}
