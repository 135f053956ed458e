//! Máquina de estados del drag-and-drop: `Idle -> Dragging(payload) -> Idle`.
//!
//! Hay un único slot: a lo sumo un drag activo. Empezar un drag con otro en
//! curso reemplaza el slot (gana el último).

use log::warn;

use crate::step::StepTypeTag;

/// Lo que se está arrastrando.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    /// Un tipo de step desde la paleta; al soltarlo se inserta un step nuevo.
    Palette(StepTypeTag),
    /// Un step de nivel superior; `index` es su posición actual.
    Step { index: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragPayload),
}

impl DragState {
    /// Empieza un drag. Devuelve el payload reemplazado, si había uno.
    pub fn begin(&mut self, payload: DragPayload) -> Option<DragPayload> {
        let previous = self.take();
        if let Some(p) = previous {
            warn!("drag {:?} replaced by {:?}", p, payload);
        }
        *self = DragState::Dragging(payload);
        previous
    }

    /// Vuelve a `Idle` y devuelve el payload activo.
    pub fn take(&mut self) -> Option<DragPayload> {
        match std::mem::take(self) {
            DragState::Idle => None,
            DragState::Dragging(p) => Some(p),
        }
    }

    pub fn payload(&self) -> Option<DragPayload> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(p) => Some(*p),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_replaces_active_drag() {
        let mut s = DragState::default();
        assert_eq!(s.begin(DragPayload::Palette(StepTypeTag::Embedding)), None);
        let replaced = s.begin(DragPayload::Palette(StepTypeTag::Generation));
        assert_eq!(replaced, Some(DragPayload::Palette(StepTypeTag::Embedding)));
        assert_eq!(s.payload(), Some(DragPayload::Palette(StepTypeTag::Generation)));
    }

    #[test]
    fn take_returns_to_idle() {
        let mut s = DragState::Dragging(DragPayload::Step { index: 2 });
        assert_eq!(s.take(), Some(DragPayload::Step { index: 2 }));
        assert!(s.is_idle());
        assert_eq!(s.take(), None);
    }
}
