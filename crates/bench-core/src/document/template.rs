//! Plantilla por defecto de un documento nuevo.

use super::{BackendKind, HardwareKind, PipelineDocument};
use crate::constants::DRAFT_DOCUMENT_ID;

pub const DEFAULT_DOCUMENT_NAME: &str = "New Benchmark Pipeline";

/// Documento borrador: backend ollama sobre GPU, sin steps y con los
/// parámetros globales por defecto. Cada llamada devuelve un valor nuevo.
pub fn default_document() -> PipelineDocument {
    PipelineDocument::new(DRAFT_DOCUMENT_ID, DEFAULT_DOCUMENT_NAME, BackendKind::Ollama, HardwareKind::Gpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_an_empty_draft() {
        let d = default_document();
        assert!(d.is_draft());
        assert!(d.is_empty());
        assert_eq!(d.name(), DEFAULT_DOCUMENT_NAME);
        assert_eq!(d.global_parameters().context_size, 4096);
        assert_eq!(d.global_parameters().gpu_layers, Some(99));
        assert!(d.global_parameters().flash_attention);
    }
}
