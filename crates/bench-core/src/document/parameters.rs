//! Parámetros globales del pipeline y tipos de backend/hardware.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::merge::merge_maps;

/// Backend que ejecutaría el pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "llama.cpp (Vulkan)")]
    LlamaCppVulkan,
    #[serde(rename = "llama-python")]
    LlamaPython,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "pytest")]
    Pytest,
    #[serde(rename = "transformers")]
    Transformers,
    #[serde(rename = "torch-directml")]
    TorchDirectml,
}

/// Hardware objetivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareKind {
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "Dual-GPU")]
    DualGpu,
}

/// Perillas globales de la corrida (contexto, temperatura, flags del
/// runtime). Los campos desconocidos se conservan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParameters {
    pub context_size: u32,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_layers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    #[serde(default)]
    pub flash_attention: bool,
    #[serde(default)]
    pub memory_lock: bool,
    #[serde(default)]
    pub continuous_batching: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    #[serde(default)]
    pub warmup: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self { context_size: 4096,
               temperature: 0.1,
               gpu_layers: Some(99),
               threads: None,
               flash_attention: true,
               memory_lock: false,
               continuous_batching: false,
               keep_alive: Some("5m".into()),
               warmup: true,
               extra: IndexMap::new() }
    }
}

impl GlobalParameters {
    /// Merge shallow de `patch`; devuelve parámetros nuevos.
    pub fn merge_patch(&self, patch: &Map<String, Value>) -> Result<Self, CoreError> {
        let current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        serde_json::from_value(Value::Object(merge_maps(&current, patch))).map_err(|e| CoreError::InvalidConfig(format!("globalParameters: {e}")))
    }
}
