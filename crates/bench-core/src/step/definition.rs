//! `PipelineStep`: una etapa del pipeline con su configuración tipada.
//!
//! En el formato de intercambio el tag vive al nivel del step (`typeTag`) y
//! la configuración es un objeto plano (`config`). La conversión pasa por
//! `StepRecord`, que además conserva los campos desconocidos del step.
//! Un `Phase` lleva además su lista ordenada de `substeps`; ningún otro tag
//! puede tener hijos.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::config::StepConfig;
use super::tag::StepTypeTag;
use crate::constants::STEP_ID_PREFIX;
use crate::errors::CoreError;

/// Identificador opaco de un step, único dentro de un documento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id nuevo, generado a partir de un UUID v4.
    pub fn fresh() -> Self {
        Self(format!("{STEP_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub id: StepId,
    pub display_name: String,
    pub enabled: bool,
    pub server_ref: Option<String>,
    pub model_ref: Option<String>,
    pub config: StepConfig,
    /// Hijos ordenados; siempre vacío salvo en un `Phase`.
    pub substeps: Vec<PipelineStep>,
    /// Campos desconocidos del step (forward compatibility).
    pub extra: IndexMap<String, Value>,
}

impl PipelineStep {
    /// Step nuevo con id fresco y la configuración dada.
    pub fn new(config: StepConfig) -> Self {
        let tag = config.tag();
        Self { id: StepId::fresh(),
               display_name: format!("New {tag} Step"),
               enabled: true,
               server_ref: None,
               model_ref: None,
               config,
               substeps: Vec::new(),
               extra: IndexMap::new() }
    }

    /// Igual que `new`, con el nombre que recibe un hijo de un `Phase`.
    pub fn new_substep(config: StepConfig) -> Self {
        let tag = config.tag();
        Self { display_name: format!("New {tag} Sub-step"),
               ..Self::new(config) }
    }

    pub fn type_tag(&self) -> StepTypeTag {
        self.config.tag()
    }

    /// Este step y todos sus descendientes, en preorden.
    pub fn walk(&self) -> Vec<&PipelineStep> {
        let mut out = vec![self];
        for child in &self.substeps {
            out.extend(child.walk());
        }
        out
    }

    /// Aplica `patch` a los campos de nivel superior; la config no cambia.
    pub fn apply_patch(&self, patch: &StepPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.display_name {
            next.display_name = name.clone();
        }
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(server_ref) = &patch.server_ref {
            next.server_ref = server_ref.clone();
        }
        if let Some(model_ref) = &patch.model_ref {
            next.model_ref = model_ref.clone();
        }
        next
    }
}

/// Patch de los campos de nivel superior de un step. Un campo ausente no se
/// toca; en las referencias, `Some(None)` las borra (vuelve al default
/// global del documento).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepPatch {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub server_ref: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub model_ref: Option<Option<String>>,
}

impl StepPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn server_ref(mut self, server_ref: Option<String>) -> Self {
        self.server_ref = Some(server_ref);
        self
    }

    pub fn model_ref(mut self, model_ref: Option<String>) -> Self {
        self.model_ref = Some(model_ref);
        self
    }
}

// Distingue "campo presente con null" de "campo ausente".
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where D: Deserializer<'de>
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Forma de intercambio de un step.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    id: StepId,
    type_tag: StepTypeTag,
    display_name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    server_ref: Option<String>,
    #[serde(default)]
    model_ref: Option<String>,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    substeps: Option<Vec<PipelineStep>>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl TryFrom<StepRecord> for PipelineStep {
    type Error = CoreError;

    fn try_from(r: StepRecord) -> Result<Self, Self::Error> {
        let substeps = r.substeps.unwrap_or_default();
        if !substeps.is_empty() && !r.type_tag.is_container() {
            return Err(CoreError::InvalidConfig(format!("step {} of type {} cannot have substeps",
                                                        r.id, r.type_tag)));
        }
        Ok(PipelineStep { id: r.id,
                          display_name: r.display_name,
                          enabled: r.enabled,
                          server_ref: r.server_ref,
                          model_ref: r.model_ref,
                          config: StepConfig::from_map(r.type_tag, r.config)?,
                          substeps,
                          extra: r.extra })
    }
}

impl TryFrom<&PipelineStep> for StepRecord {
    type Error = CoreError;

    fn try_from(s: &PipelineStep) -> Result<Self, Self::Error> {
        Ok(StepRecord { id: s.id.clone(),
                        type_tag: s.type_tag(),
                        display_name: s.display_name.clone(),
                        enabled: s.enabled,
                        server_ref: s.server_ref.clone(),
                        model_ref: s.model_ref.clone(),
                        config: s.config.to_map()?,
                        substeps: s.type_tag().is_container().then(|| s.substeps.clone()),
                        extra: s.extra.clone() })
    }
}

impl Serialize for PipelineStep {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StepRecord::try_from(self).map_err(serde::ser::Error::custom)?
                                  .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = StepRecord::deserialize(deserializer)?;
        PipelineStep::try_from(record).map_err(serde::de::Error::custom)
    }
}
