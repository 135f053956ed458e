//! `PipelineEditor`: orquesta las ediciones interactivas sobre un documento.
//!
//! El editor es el estado que mantiene el caller (el documento abierto, el
//! drag activo, el step expandido). Cada mutación construye un documento
//! nuevo con las operaciones puras de `PipelineDocument` y lo publica con un
//! único reemplazo del `Arc`: quien tenga un `snapshot()` nunca ve un
//! documento a medio editar. Si la operación falla el documento actual no
//! cambia.
//!
//! Un drag de step reordena en vivo y guarda el documento previo al drag:
//! cancelarlo o soltarlo fuera restaura ese documento de una sola vez. Una
//! edición directa durante el drag lo da por terminado en la posición
//! actual.
//!
//! Ejemplo (comentario):
//!
//! ```ignore
//! let mut editor = PipelineEditor::new(default_document());
//! editor.start_drag(StepTypeTag::Retrieval);
//! let id = editor.drop_on_document();       // inserta el step
//! editor.update_step_config(&id.unwrap(), &patch)?;
//! ```

pub mod drag;

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

pub use drag::{DragPayload, DragState};

use crate::document::template::default_document;
use crate::document::PipelineDocument;
use crate::errors::CoreError;
use crate::step::{StepId, StepPatch, StepTypeTag};

#[derive(Debug, Clone)]
pub struct PipelineEditor {
    document: Arc<PipelineDocument>,
    drag: DragState,
    // Documento previo al drag de step activo; `None` fuera de ese drag.
    drag_origin: Option<Arc<PipelineDocument>>,
    expanded: Option<StepId>,
    saved_fingerprint: Option<String>,
}

impl PipelineEditor {
    pub fn new(document: PipelineDocument) -> Self {
        Self { document: Arc::new(document),
               drag: DragState::Idle,
               drag_origin: None,
               expanded: None,
               saved_fingerprint: None }
    }

    /// Editor sobre la plantilla por defecto.
    pub fn with_default_document() -> Self {
        Self::new(default_document())
    }

    /// Vista inmutable del documento actual.
    pub fn snapshot(&self) -> Arc<PipelineDocument> {
        Arc::clone(&self.document)
    }

    pub fn document(&self) -> &PipelineDocument {
        &self.document
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn expanded(&self) -> Option<&StepId> {
        self.expanded.as_ref()
    }

    /// Publica el resultado de una edición directa. Un drag de step en curso
    /// termina donde está.
    fn commit(&mut self, next: PipelineDocument) {
        if let Some(DragPayload::Step { index }) = self.drag.payload() {
            debug!("step drag settled at {index} by a direct edit");
            self.drag = DragState::Idle;
            self.drag_origin = None;
        }
        self.document = Arc::new(next);
    }

    // Vuelve a `Idle`; devuelve el payload y el documento previo al drag.
    fn end_drag(&mut self) -> (Option<DragPayload>, Option<Arc<PipelineDocument>>) {
        (self.drag.take(), self.drag_origin.take())
    }

    // --- drag & drop ---

    /// Empieza a arrastrar un tipo desde la paleta. Un drag de step activo
    /// se abandona como si se soltara fuera.
    pub fn start_drag(&mut self, tag: StepTypeTag) {
        self.abandon_step_drag();
        debug!("drag start: palette {tag}");
        self.drag.begin(DragPayload::Palette(tag));
    }

    /// Empieza a arrastrar el step de nivel superior en `index` para
    /// reordenarlo. Un drag de step activo se abandona primero, así que
    /// `index` se refiere al documento ya restaurado.
    pub fn start_step_drag(&mut self, index: usize) -> Result<(), CoreError> {
        self.abandon_step_drag();
        let len = self.document.len();
        if index >= len {
            return Err(CoreError::IndexOutOfRange { index, len });
        }
        debug!("drag start: step at {index}");
        self.drag.begin(DragPayload::Step { index });
        self.drag_origin = Some(self.snapshot());
        Ok(())
    }

    /// El puntero pasa sobre la posición `index`. Si se arrastra un step, se
    /// mueve ahí en vivo y el payload registra su nueva posición. Con un
    /// payload de paleta (o sin drag) no hace nada.
    pub fn drag_over(&mut self, index: usize) -> Result<(), CoreError> {
        if let Some(DragPayload::Step { index: from }) = self.drag.payload() {
            if from != index {
                let next = self.document.reorder(from, index)?;
                // No pasa por `commit`: el drag sigue activo.
                self.document = Arc::new(next);
                self.drag = DragState::Dragging(DragPayload::Step { index });
            }
        }
        Ok(())
    }

    /// Suelta sobre el documento. Un tipo de paleta se inserta al final y
    /// pasa a ser el step expandido; devuelve su id. Un step arrastrado
    /// queda donde está. Siempre vuelve a `Idle`.
    pub fn drop_on_document(&mut self) -> Option<StepId> {
        match self.end_drag().0 {
            Some(DragPayload::Palette(tag)) => Some(self.insert_step(tag, None)),
            Some(DragPayload::Step { .. }) | None => None,
        }
    }

    /// Suelta en una posición concreta. Con un step arrastrado equivale a un
    /// último `drag_over(index)`. Un índice fuera de rango cuenta como soltar
    /// fuera: se restaura el documento previo al drag y se devuelve el error.
    pub fn drop_at(&mut self, index: usize) -> Result<Option<StepId>, CoreError> {
        match self.end_drag() {
            (Some(DragPayload::Palette(tag)), _) => Ok(Some(self.insert_step(tag, Some(index)))),
            (Some(DragPayload::Step { index: from }), origin) => {
                if from != index {
                    match self.document.reorder(from, index) {
                        Ok(next) => self.document = Arc::new(next),
                        Err(e) => {
                            if let Some(origin) = origin {
                                self.document = origin;
                            }
                            return Err(e);
                        }
                    }
                }
                Ok(None)
            }
            (None, _) => Ok(None),
        }
    }

    /// Suelta sobre el `Phase` `parent_id`. Un tipo de paleta se agrega al
    /// final de sus substeps y pasa a ser el step expandido. Un step
    /// arrastrado queda donde está: el reordenamiento no cruza niveles. Si el
    /// padre no sirve, vuelve a `Idle` con el error y sin mutar.
    pub fn drop_into(&mut self, parent_id: &StepId) -> Result<Option<StepId>, CoreError> {
        match self.end_drag().0 {
            Some(DragPayload::Palette(tag)) => self.insert_substep(parent_id, tag).map(Some),
            Some(DragPayload::Step { .. }) | None => Ok(None),
        }
    }

    /// Suelta fuera de cualquier destino válido: vuelve a `Idle`. Un drag de
    /// step restaura el documento previo al drag con un único reemplazo.
    pub fn drop_outside(&mut self) {
        let (payload, origin) = self.end_drag();
        if let Some(p) = payload {
            debug!("drag {p:?} dropped outside");
        }
        if let Some(origin) = origin {
            self.document = origin;
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drop_outside();
    }

    fn abandon_step_drag(&mut self) {
        if let Some(DragPayload::Step { .. }) = self.drag.payload() {
            self.drop_outside();
        }
    }

    // --- ediciones directas ---

    /// Inserta un step nuevo, lo expande y devuelve su id.
    pub fn insert_step(&mut self, tag: StepTypeTag, at_index: Option<usize>) -> StepId {
        let before = self.document.len();
        let next = self.document.insert_step(tag, at_index);
        let index = at_index.map_or(before, |i| i.min(before));
        let id = next.steps()[index].id.clone();
        self.commit(next);
        self.expanded = Some(id.clone());
        id
    }

    /// Agrega un substep al `Phase` `parent_id`, lo expande y devuelve su id.
    pub fn insert_substep(&mut self, parent_id: &StepId, tag: StepTypeTag) -> Result<StepId, CoreError> {
        let next = self.document.insert_substep(parent_id, tag)?;
        let id = next.step(parent_id)
                     .and_then(|parent| parent.substeps.last())
                     .map(|s| s.id.clone())
                     .ok_or_else(|| CoreError::StepNotFound(parent_id.to_string()))?;
        self.commit(next);
        self.expanded = Some(id.clone());
        Ok(id)
    }

    /// Elimina el step (idempotente). Si el expandido desaparece (él mismo o
    /// dentro de un `Phase` eliminado), colapsa.
    pub fn remove_step(&mut self, step_id: &StepId) {
        let next = self.document.remove_step(step_id);
        self.commit(next);
        let gone = self.expanded.as_ref().is_some_and(|id| !self.document.contains(id));
        if gone {
            self.expanded = None;
        }
    }

    pub fn update_step_field(&mut self, step_id: &StepId, patch: &StepPatch) -> Result<(), CoreError> {
        let next = self.document.update_step_field(step_id, patch)?;
        self.commit(next);
        Ok(())
    }

    pub fn update_step_config(&mut self, step_id: &StepId, patch: &Map<String, Value>) -> Result<(), CoreError> {
        let next = self.document.update_step_config(step_id, patch)?;
        self.commit(next);
        Ok(())
    }

    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> Result<(), CoreError> {
        let next = self.document.reorder(from_index, to_index)?;
        self.commit(next);
        Ok(())
    }

    pub fn update_parameters(&mut self, patch: &Map<String, Value>) -> Result<(), CoreError> {
        let next = self.document.update_parameters(patch)?;
        self.commit(next);
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        let next = self.document.with_name(name);
        self.commit(next);
    }

    // --- estado de vista ---

    /// Expande `step_id`, o lo colapsa si ya estaba expandido.
    pub fn toggle_expanded(&mut self, step_id: &StepId) {
        if self.expanded.as_ref() == Some(step_id) {
            self.expanded = None;
        } else if self.document.contains(step_id) {
            self.expanded = Some(step_id.clone());
        }
    }

    // --- ciclo de vida ---

    /// Abre otro documento. El editor guarda su propia copia; el estado de
    /// drag y de expansión se reinicia.
    pub fn load(&mut self, document: PipelineDocument) {
        debug!("editor: load document {}", document.id());
        self.saved_fingerprint = document.fingerprint().ok();
        self.commit(document);
        self.drag = DragState::Idle;
        self.drag_origin = None;
        self.expanded = None;
    }

    /// Abre un borrador nuevo desde la plantilla.
    pub fn new_document(&mut self) {
        self.load(default_document());
        self.saved_fingerprint = None;
    }

    /// Marca el documento actual como guardado. Si el repositorio le asignó
    /// un id, se pasa el documento devuelto por `save`.
    pub fn mark_saved(&mut self, saved: PipelineDocument) {
        self.saved_fingerprint = saved.fingerprint().ok();
        self.commit(saved);
    }

    /// Cambios sin guardar respecto del último `mark_saved`/`load`.
    pub fn is_dirty(&self) -> bool {
        match (&self.saved_fingerprint, self.document.fingerprint()) {
            (Some(saved), Ok(current)) => *saved != current,
            _ => true,
        }
    }
}

impl Default for PipelineEditor {
    fn default() -> Self {
        Self::with_default_document()
    }
}
