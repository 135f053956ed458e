//! Constantes del core.
//!
//! Valores estáticos compartidos por el documento, el editor y el
//! repositorio. `DRAFT_DOCUMENT_ID` identifica un documento que todavía no
//! fue guardado: el repositorio le asigna un id definitivo al persistirlo.

/// Id de un documento borrador (plantilla por defecto sin guardar).
pub const DRAFT_DOCUMENT_ID: &str = "new-config";

/// Prefijo de los ids generados para steps nuevos.
pub const STEP_ID_PREFIX: &str = "step-";

/// Prefijo de los ids asignados por el repositorio a documentos guardados.
pub const DOCUMENT_ID_PREFIX: &str = "cfg-";
