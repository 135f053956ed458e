//! `PipelineDocument`: secuencia ordenada de steps más parámetros globales.
//!
//! Todas las operaciones son transformaciones puras: reciben `&self` y
//! devuelven un documento nuevo, sin mutación compartida. El orden de los
//! steps es el orden de ejecución previsto y sólo cambia con `reorder`.
//!
//! Invariantes mantenidos por todas las operaciones:
//! - los ids de steps son únicos dentro del documento, contando los
//!   substeps de cada `Phase` a cualquier profundidad;
//! - los steps no editados conservan su posición relativa.
//!
//! Editar y eliminar buscan el step en todo el árbol; `reorder` y
//! `position` trabajan sólo sobre el nivel superior.
//!
//! Política de errores: editar un step inexistente es un bug del caller
//! (`StepNotFound`); eliminarlo no lo es (`remove_step` es idempotente).

pub mod parameters;
pub mod template;

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use parameters::{BackendKind, GlobalParameters, HardwareKind};

use crate::constants::DRAFT_DOCUMENT_ID;
use crate::errors::CoreError;
use crate::hashing::hash_value;
use crate::step::{PipelineStep, StepId, StepPatch, StepTypeRegistry, StepTypeTag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocumentRecord")]
pub struct PipelineDocument {
    id: String,
    name: String,
    backend_kind: BackendKind,
    target_model_ref: Option<String>,
    target_hardware_kind: HardwareKind,
    global_parameters: GlobalParameters,
    steps: Vec<PipelineStep>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

/// Forma de lectura: valida la unicidad de ids antes de construir el
/// documento.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    id: String,
    name: String,
    backend_kind: BackendKind,
    #[serde(default)]
    target_model_ref: Option<String>,
    target_hardware_kind: HardwareKind,
    #[serde(default)]
    global_parameters: GlobalParameters,
    #[serde(default)]
    steps: Vec<PipelineStep>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl TryFrom<DocumentRecord> for PipelineDocument {
    type Error = CoreError;

    fn try_from(r: DocumentRecord) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for step in r.steps.iter().flat_map(PipelineStep::walk) {
            if !seen.insert(step.id.clone()) {
                return Err(CoreError::DuplicateStepId(step.id.to_string()));
            }
        }
        Ok(PipelineDocument { id: r.id,
                              name: r.name,
                              backend_kind: r.backend_kind,
                              target_model_ref: r.target_model_ref,
                              target_hardware_kind: r.target_hardware_kind,
                              global_parameters: r.global_parameters,
                              steps: r.steps,
                              extra: r.extra })
    }
}

impl PipelineDocument {
    /// Documento vacío (sin steps) con parámetros por defecto.
    pub fn new(id: impl Into<String>, name: impl Into<String>, backend_kind: BackendKind, target_hardware_kind: HardwareKind) -> Self {
        Self { id: id.into(),
               name: name.into(),
               backend_kind,
               target_model_ref: None,
               target_hardware_kind,
               global_parameters: GlobalParameters::default(),
               steps: Vec::new(),
               extra: IndexMap::new() }
    }

    /// Inserta un step nuevo de tipo `tag` con id fresco y la configuración
    /// por defecto del registro. Sin `at_index`, o con un índice mayor al
    /// largo, lo agrega al final. Nunca falla.
    pub fn insert_step(&self, tag: StepTypeTag, at_index: Option<usize>) -> Self {
        let step = PipelineStep::new(StepTypeRegistry::new().defaults_for(tag));
        self.insert_prepared(step, at_index)
    }

    fn insert_prepared(&self, mut step: PipelineStep, at_index: Option<usize>) -> Self {
        while self.contains(&step.id) {
            step.id = StepId::fresh();
        }
        let mut next = self.clone();
        let index = at_index.map_or(next.steps.len(), |i| i.min(next.steps.len()));
        debug!("doc {}: insert {} step {} at {}", self.id, step.type_tag(), step.id, index);
        next.steps.insert(index, step);
        next
    }

    /// Agrega un step nuevo de tipo `tag` al final de los substeps de
    /// `parent_id`, que puede estar a cualquier profundidad. Falla con
    /// `StepNotFound` si el padre no existe y con `NotAContainer` si no es
    /// un `Phase`.
    pub fn insert_substep(&self, parent_id: &StepId, tag: StepTypeTag) -> Result<Self, CoreError> {
        let mut step = PipelineStep::new_substep(StepTypeRegistry::new().defaults_for(tag));
        while self.contains(&step.id) {
            step.id = StepId::fresh();
        }
        let mut next = self.clone();
        let parent = find_mut(&mut next.steps, parent_id).ok_or_else(|| CoreError::StepNotFound(parent_id.to_string()))?;
        if !parent.type_tag().is_container() {
            return Err(CoreError::NotAContainer(parent_id.to_string()));
        }
        debug!("doc {}: insert {} substep {} into {}", self.id, tag, step.id, parent_id);
        parent.substeps.push(step);
        Ok(next)
    }

    /// Elimina el step `step_id` (con sus substeps) de cualquier nivel. Si
    /// no existe devuelve una copia sin cambios: borrar dos veces es igual
    /// que borrar una.
    pub fn remove_step(&self, step_id: &StepId) -> Self {
        let mut next = self.clone();
        if remove_from(&mut next.steps, step_id) {
            debug!("doc {}: removed step {}", self.id, step_id);
        }
        next
    }

    /// Merge shallow de `patch` en los campos de nivel superior del step.
    pub fn update_step_field(&self, step_id: &StepId, patch: &StepPatch) -> Result<Self, CoreError> {
        let mut next = self.clone();
        let step = require_mut(&mut next.steps, step_id)?;
        *step = step.apply_patch(patch);
        Ok(next)
    }

    /// Merge shallow de `config_patch` en la configuración del step. Los
    /// campos ausentes en el patch quedan intactos.
    pub fn update_step_config(&self, step_id: &StepId, config_patch: &Map<String, Value>) -> Result<Self, CoreError> {
        let mut next = self.clone();
        let step = require_mut(&mut next.steps, step_id)?;
        step.config = step.config.merge_patch(config_patch)?;
        debug!("doc {}: config of step {} patched ({} keys)", self.id, step_id, config_patch.len());
        Ok(next)
    }

    /// Mueve el step de nivel superior en `from_index` a `to_index`.
    pub fn reorder(&self, from_index: usize, to_index: usize) -> Result<Self, CoreError> {
        let len = self.steps.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(CoreError::IndexOutOfRange { index, len });
            }
        }
        let mut next = self.clone();
        let step = next.steps.remove(from_index);
        next.steps.insert(to_index, step);
        Ok(next)
    }

    /// Merge shallow de `patch` en los parámetros globales.
    pub fn update_parameters(&self, patch: &Map<String, Value>) -> Result<Self, CoreError> {
        let global_parameters = self.global_parameters.merge_patch(patch)?;
        Ok(Self { global_parameters, ..self.clone() })
    }

    /// Crea una nueva instancia con nombre modificado
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self.clone() }
    }

    /// Crea una nueva instancia con otro id
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self { id: id.into(), ..self.clone() }
    }

    pub fn with_backend(&self, backend_kind: BackendKind) -> Self {
        Self { backend_kind, ..self.clone() }
    }

    pub fn with_target_model(&self, target_model_ref: Option<String>) -> Self {
        Self { target_model_ref, ..self.clone() }
    }

    pub fn with_hardware(&self, target_hardware_kind: HardwareKind) -> Self {
        Self { target_hardware_kind, ..self.clone() }
    }

    /// Hash estable del documento (blake3 sobre JSON canónico). Dos
    /// documentos con los mismos datos tienen el mismo fingerprint.
    pub fn fingerprint(&self) -> Result<String, CoreError> {
        Ok(hash_value(&serde_json::to_value(self)?))
    }

    /// Indica si el documento todavía no fue guardado en un repositorio.
    pub fn is_draft(&self) -> bool {
        self.id.is_empty() || self.id == DRAFT_DOCUMENT_ID
    }

    // Getters
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend_kind
    }

    pub fn target_model_ref(&self) -> Option<&str> {
        self.target_model_ref.as_deref()
    }

    pub fn target_hardware_kind(&self) -> HardwareKind {
        self.target_hardware_kind
    }

    pub fn global_parameters(&self) -> &GlobalParameters {
        &self.global_parameters
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }

    /// Busca en todo el árbol.
    pub fn step(&self, step_id: &StepId) -> Option<&PipelineStep> {
        find(&self.steps, step_id)
    }

    /// Índice entre los steps de nivel superior.
    pub fn position(&self, step_id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == step_id)
    }

    pub fn contains(&self, step_id: &StepId) -> bool {
        self.step(step_id).is_some()
    }

    /// Todos los steps en preorden, substeps incluidos.
    pub fn all_steps(&self) -> Vec<&PipelineStep> {
        self.steps.iter().flat_map(PipelineStep::walk).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn find<'a>(steps: &'a [PipelineStep], step_id: &StepId) -> Option<&'a PipelineStep> {
    steps.iter()
         .find_map(|s| if &s.id == step_id { Some(s) } else { find(&s.substeps, step_id) })
}

fn find_mut<'a>(steps: &'a mut [PipelineStep], step_id: &StepId) -> Option<&'a mut PipelineStep> {
    for step in steps {
        if &step.id == step_id {
            return Some(step);
        }
        if let Some(found) = find_mut(&mut step.substeps, step_id) {
            return Some(found);
        }
    }
    None
}

fn require_mut<'a>(steps: &'a mut [PipelineStep], step_id: &StepId) -> Result<&'a mut PipelineStep, CoreError> {
    find_mut(steps, step_id).ok_or_else(|| CoreError::StepNotFound(step_id.to_string()))
}

// Los ids son únicos: basta con la primera coincidencia.
fn remove_from(steps: &mut Vec<PipelineStep>, step_id: &StepId) -> bool {
    let before = steps.len();
    steps.retain(|s| &s.id != step_id);
    steps.len() != before || steps.iter_mut().any(|s| remove_from(&mut s.substeps, step_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> PipelineDocument {
        PipelineDocument::new("cfg-test", "test", BackendKind::Ollama, HardwareKind::Gpu)
    }

    fn ids(d: &PipelineDocument) -> Vec<StepId> {
        d.steps().iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn insert_appends_or_places_at_index() {
        let d = doc().insert_step(StepTypeTag::Retrieval, None)
                     .insert_step(StepTypeTag::Generation, None)
                     .insert_step(StepTypeTag::Embedding, Some(0))
                     .insert_step(StepTypeTag::Custom, Some(99));
        let tags: Vec<StepTypeTag> = d.steps().iter().map(|s| s.type_tag()).collect();
        assert_eq!(tags,
                   vec![StepTypeTag::Embedding, StepTypeTag::Retrieval, StepTypeTag::Generation, StepTypeTag::Custom]);
    }

    #[test]
    fn insert_leaves_original_untouched() {
        let original = doc();
        let next = original.insert_step(StepTypeTag::Rerank, None);
        assert!(original.is_empty());
        assert_eq!(next.len(), 1);
        assert_eq!(next.steps()[0].display_name, "New Rerank Step");
    }

    #[test]
    fn remove_missing_step_is_noop() {
        let d = doc().insert_step(StepTypeTag::Retrieval, None);
        let same = d.remove_step(&StepId::new("nope"));
        assert_eq!(same, d);
    }

    #[test]
    fn edits_on_missing_step_fail() {
        let d = doc();
        let missing = StepId::new("ghost");
        assert_eq!(d.update_step_field(&missing, &StepPatch::new().enabled(false)).unwrap_err(),
                   CoreError::StepNotFound("ghost".into()));
        assert_eq!(d.update_step_config(&missing, &Map::new()).unwrap_err(),
                   CoreError::StepNotFound("ghost".into()));
    }

    #[test]
    fn update_config_keeps_position_and_fields() {
        let d = doc().insert_step(StepTypeTag::Generation, None)
                     .insert_step(StepTypeTag::Retrieval, None)
                     .insert_step(StepTypeTag::Embedding, None);
        let target = d.steps()[1].id.clone();
        let patch = json!({"rerankTopK": 12});
        let next = d.update_step_config(&target, patch.as_object().unwrap()).unwrap();
        assert_eq!(ids(&next), ids(&d));
        let cfg = next.steps()[1].config.as_retrieval().unwrap();
        assert_eq!(cfg.rerank_top_k, Some(12));
        assert_eq!(cfg.vector_store_kind.as_deref(), Some("ChromaDB"));
    }

    #[test]
    fn update_field_does_not_touch_config() {
        let d = doc().insert_step(StepTypeTag::Extraction, None);
        let id = d.steps()[0].id.clone();
        let next = d.update_step_field(&id, &StepPatch::new().display_name("Parse PDFs").enabled(false))
                    .unwrap();
        assert_eq!(next.steps()[0].display_name, "Parse PDFs");
        assert!(!next.steps()[0].enabled);
        assert_eq!(next.steps()[0].config, d.steps()[0].config);
    }

    #[test]
    fn invalid_config_patch_leaves_document_unchanged() {
        let d = doc().insert_step(StepTypeTag::Retrieval, None);
        let id = d.steps()[0].id.clone();
        let patch = json!({"rerankTopK": "many"});
        assert!(matches!(d.update_step_config(&id, patch.as_object().unwrap()), Err(CoreError::InvalidConfig(_))));
        assert_eq!(d.steps()[0].config.as_retrieval().unwrap().rerank_top_k, Some(5));
    }

    #[test]
    fn reorder_moves_one_step() {
        let d = doc().insert_step(StepTypeTag::Generation, None)
                     .insert_step(StepTypeTag::Retrieval, None)
                     .insert_step(StepTypeTag::Embedding, None);
        let before = ids(&d);
        let next = d.reorder(0, 2).unwrap();
        assert_eq!(ids(&next), vec![before[1].clone(), before[2].clone(), before[0].clone()]);
        assert_eq!(d.reorder(3, 0).unwrap_err(), CoreError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(d.reorder(0, 5).unwrap_err(), CoreError::IndexOutOfRange { index: 5, len: 3 });
    }

    #[test]
    fn duplicate_step_ids_are_rejected_on_read() {
        let raw = json!({
            "id": "cfg-1", "name": "dup", "backendKind": "ollama", "targetHardwareKind": "GPU",
            "steps": [
                {"id": "s1", "typeTag": "Generation", "displayName": "a", "config": {}},
                {"id": "s1", "typeTag": "Retrieval", "displayName": "b", "config": {}}
            ]
        });
        let err = serde_json::from_value::<PipelineDocument>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate step id"));
    }

    fn with_phase() -> (PipelineDocument, StepId) {
        let d = doc().insert_step(StepTypeTag::Extraction, None)
                     .insert_step(StepTypeTag::Phase, None)
                     .insert_step(StepTypeTag::Generation, None);
        let phase = d.steps()[1].id.clone();
        let d = d.insert_substep(&phase, StepTypeTag::Embedding)
                 .unwrap()
                 .insert_substep(&phase, StepTypeTag::Retrieval)
                 .unwrap();
        (d, phase)
    }

    #[test]
    fn substeps_append_to_their_phase() {
        let (d, phase) = with_phase();
        let children = &d.step(&phase).unwrap().substeps;
        let tags: Vec<StepTypeTag> = children.iter().map(|s| s.type_tag()).collect();
        assert_eq!(tags, vec![StepTypeTag::Embedding, StepTypeTag::Retrieval]);
        assert_eq!(children[0].display_name, "New Embedding Sub-step");
        assert_eq!(d.len(), 3);
        assert_eq!(d.all_steps().len(), 5);
        assert_eq!(d.position(&children[0].id), None);
        assert!(d.contains(&children[0].id));
    }

    #[test]
    fn substep_parent_must_be_a_phase() {
        let (d, _) = with_phase();
        let leaf = d.steps()[0].id.clone();
        assert_eq!(d.insert_substep(&leaf, StepTypeTag::Custom).unwrap_err(),
                   CoreError::NotAContainer(leaf.to_string()));
        assert_eq!(d.insert_substep(&StepId::new("ghost"), StepTypeTag::Custom).unwrap_err(),
                   CoreError::StepNotFound("ghost".into()));
    }

    #[test]
    fn nested_steps_are_edited_and_removed_in_place() {
        let (d, phase) = with_phase();
        let child = d.step(&phase).unwrap().substeps[1].id.clone();

        let d = d.update_step_field(&child, &StepPatch::new().display_name("Vector Search")).unwrap();
        let patch = json!({"rerankTopK": 10});
        let d = d.update_step_config(&child, patch.as_object().unwrap()).unwrap();
        let edited = d.step(&child).unwrap();
        assert_eq!(edited.display_name, "Vector Search");
        assert_eq!(edited.config.as_retrieval().and_then(|c| c.rerank_top_k), Some(10));
        assert_eq!(d.step(&phase).unwrap().substeps[1].id, child);

        let d = d.remove_step(&child);
        assert!(!d.contains(&child));
        assert_eq!(d.step(&phase).unwrap().substeps.len(), 1);
        assert_eq!(d.len(), 3);

        let d = d.remove_step(&phase);
        assert_eq!(d.all_steps().len(), 2);
    }

    #[test]
    fn duplicate_ids_across_levels_are_rejected_on_read() {
        let raw = json!({
            "id": "cfg-1", "name": "dup", "backendKind": "ollama", "targetHardwareKind": "GPU",
            "steps": [
                {"id": "s1", "typeTag": "Generation", "displayName": "a", "config": {}},
                {"id": "s2", "typeTag": "Phase", "displayName": "p", "config": {},
                 "substeps": [{"id": "s1", "typeTag": "Retrieval", "displayName": "b", "config": {}}]}
            ]
        });
        let err = serde_json::from_value::<PipelineDocument>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate step id: s1"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let d = doc();
        let a = d.fingerprint().unwrap();
        assert_eq!(a, d.clone().fingerprint().unwrap());
        assert_ne!(a, d.with_name("renamed").fingerprint().unwrap());
    }
}
