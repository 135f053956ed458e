//! Configuración polimórfica de steps.
//!
//! `StepConfig` es un sum type con un registro por `StepTypeTag`. Cada
//! registro declara sus campos tipados (todos opcionales para poder leer
//! documentos parciales) y un mapa lateral `extra` que conserva, en su orden
//! original, los campos desconocidos: no se interpretan pero tampoco se
//! pierden al reescribir el documento.
//!
//! La conversión desde/hacia `serde_json::Map` es el punto donde se aplican
//! los patches del editor (ver `StepConfig::merge_patch`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tag::StepTypeTag;
use crate::errors::CoreError;
use crate::merge::merge_maps;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_ref: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_kind: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_schema_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<u32>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Un `Phase` no interpreta campos; sólo conserva los desconocidos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Genera el enum `StepConfig` y el dispatch por variante. Cada entrada une
/// un `StepTypeTag` con su registro de configuración.
macro_rules! step_configs {
    ($($variant:ident => $record:ident),+ $(,)?) => {
        /// Configuración de un step, una variante por tag.
        #[derive(Debug, Clone, PartialEq)]
        pub enum StepConfig {
            $($variant($record),)+
        }

        impl StepConfig {
            /// Tag al que pertenece esta configuración.
            pub fn tag(&self) -> StepTypeTag {
                match self {
                    $(StepConfig::$variant(_) => StepTypeTag::$variant,)+
                }
            }

            /// Configuración vacía (todos los campos ausentes) para `tag`.
            pub fn empty(tag: StepTypeTag) -> Self {
                match tag {
                    $(StepTypeTag::$variant => StepConfig::$variant($record::default()),)+
                }
            }

            /// Campos desconocidos preservados.
            pub fn extra(&self) -> &IndexMap<String, Value> {
                match self {
                    $(StepConfig::$variant(c) => &c.extra,)+
                }
            }

            /// Serializa la configuración como objeto JSON plano.
            pub fn to_map(&self) -> Result<Map<String, Value>, CoreError> {
                let value = match self {
                    $(StepConfig::$variant(c) => serde_json::to_value(c)?,)+
                };
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(CoreError::InvalidConfig(format!("config must be an object, got {other}"))),
                }
            }

            /// Interpreta `map` como la configuración de `tag`. Un campo
            /// conocido con un tipo incorrecto es `InvalidConfig`.
            pub fn from_map(tag: StepTypeTag, map: Map<String, Value>) -> Result<Self, CoreError> {
                let value = Value::Object(map);
                let invalid = |e: serde_json::Error| CoreError::InvalidConfig(format!("{tag}: {e}"));
                match tag {
                    $(StepTypeTag::$variant => serde_json::from_value::<$record>(value).map(StepConfig::$variant).map_err(invalid),)+
                }
            }
        }
    };
}

step_configs! {
    Generation => GenerationConfig,
    Retrieval => RetrievalConfig,
    Embedding => EmbeddingConfig,
    Custom => CustomConfig,
    ToolCalling => ToolCallingConfig,
    Rerank => RerankConfig,
    Extraction => ExtractionConfig,
    Routing => RoutingConfig,
    Classification => ClassificationConfig,
    Phase => PhaseConfig,
}

impl StepConfig {
    /// Merge shallow de `patch` sobre la configuración actual. Los campos que
    /// no aparecen en el patch quedan intactos; las claves desconocidas van a
    /// `extra`. Devuelve un valor nuevo, `self` no cambia.
    pub fn merge_patch(&self, patch: &Map<String, Value>) -> Result<Self, CoreError> {
        let current = self.to_map()?;
        StepConfig::from_map(self.tag(), merge_maps(&current, patch))
    }

    pub fn as_retrieval(&self) -> Option<&RetrievalConfig> {
        match self {
            StepConfig::Retrieval(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_embedding(&self) -> Option<&EmbeddingConfig> {
        match self {
            StepConfig::Embedding(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_generation(&self) -> Option<&GenerationConfig> {
        match self {
            StepConfig::Generation(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_extraction(&self) -> Option<&ExtractionConfig> {
        match self {
            StepConfig::Extraction(c) => Some(c),
            _ => None,
        }
    }
}
