//! Comparación direccional de métricas entre dos entidades (p.ej. dos
//! modelos lado a lado).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Better,
    Worse,
    Tie,
    /// Falta un valor: no comparable, que no es lo mismo que peor.
    Unknown,
}

/// Clasifica `a` respecto de `b`. Total: nunca falla ni entra en pánico.
pub fn compare(a: Option<f64>, b: Option<f64>, lower_is_better: bool) -> Direction {
    let (Some(a), Some(b)) = (a, b) else {
        return Direction::Unknown;
    };
    if a.is_nan() || b.is_nan() {
        return Direction::Unknown;
    }
    if a == b {
        return Direction::Tie;
    }
    match (a > b, lower_is_better) {
        (true, false) | (false, true) => Direction::Better,
        _ => Direction::Worse,
    }
}

/// Métricas conocidas; el orden de declaración es el orden de salida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Perplexity,
    LatencyMs,
    Accuracy,
    VramGb,
    TokensPerSecond,
    Score,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [MetricKind::Perplexity,
                                      MetricKind::LatencyMs,
                                      MetricKind::Accuracy,
                                      MetricKind::VramGb,
                                      MetricKind::TokensPerSecond,
                                      MetricKind::Score];

    pub fn lower_is_better(self) -> bool {
        matches!(self, MetricKind::Perplexity | MetricKind::LatencyMs | MetricKind::VramGb)
    }
}

/// Bolsa de métricas de una entidad.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<MetricKind, f64>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: MetricKind, value: f64) -> Self {
        self.0.insert(kind, value);
        self
    }

    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.0.keys().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub kind: MetricKind,
    pub a: Option<f64>,
    pub b: Option<f64>,
    /// `a - b` cuando ambos existen.
    pub delta: Option<f64>,
    pub direction: Direction,
}

/// Una fila por métrica presente en cualquiera de los dos conjuntos.
pub fn compare_sets(a: &MetricSet, b: &MetricSet) -> Vec<MetricDelta> {
    MetricKind::ALL.iter()
                   .copied()
                   .filter(|k| a.get(*k).is_some() || b.get(*k).is_some())
                   .map(|kind| {
                       let (va, vb) = (a.get(kind), b.get(kind));
                       MetricDelta { kind,
                                     a: va,
                                     b: vb,
                                     delta: va.zip(vb).map(|(x, y)| x - y),
                                     direction: compare(va, vb, kind.lower_is_better()) }
                   })
                   .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_examples() {
        assert_eq!(compare(Some(10.0), Some(20.0), true), Direction::Better);
        assert_eq!(compare(Some(10.0), Some(20.0), false), Direction::Worse);
        assert_eq!(compare(Some(10.0), Some(10.0), false), Direction::Tie);
        assert_eq!(compare(None, Some(5.0), false), Direction::Unknown);
        assert_eq!(compare(Some(5.0), None, true), Direction::Unknown);
        assert_eq!(compare(Some(f64::NAN), Some(1.0), true), Direction::Unknown);
    }

    #[test]
    fn sets_compare_with_each_polarity() {
        let saul = MetricSet::new().with(MetricKind::Perplexity, 4.1)
                                   .with(MetricKind::TokensPerSecond, 38.0)
                                   .with(MetricKind::VramGb, 6.0);
        let llama = MetricSet::new().with(MetricKind::Perplexity, 5.3)
                                    .with(MetricKind::TokensPerSecond, 45.0)
                                    .with(MetricKind::Accuracy, 0.71);
        let deltas = compare_sets(&saul, &llama);
        let kinds: Vec<MetricKind> = deltas.iter().map(|d| d.kind).collect();
        assert_eq!(kinds,
                   vec![MetricKind::Perplexity, MetricKind::Accuracy, MetricKind::VramGb, MetricKind::TokensPerSecond]);
        assert_eq!(deltas[0].direction, Direction::Better);
        assert_eq!(deltas[1].direction, Direction::Unknown);
        assert_eq!(deltas[1].delta, None);
        assert_eq!(deltas[2].direction, Direction::Unknown);
        assert_eq!(deltas[3].direction, Direction::Worse);
        assert_eq!(deltas[3].delta, Some(-7.0));
    }

    #[test]
    fn metric_set_reads_camel_case_keys() {
        let set: MetricSet = serde_json::from_value(serde_json::json!({"latencyMs": 120.0, "vramGb": 5.5})).unwrap();
        assert_eq!(set.get(MetricKind::LatencyMs), Some(120.0));
        assert_eq!(set.kinds().count(), 2);
    }
}
