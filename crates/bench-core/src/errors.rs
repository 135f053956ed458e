//! Errores del core de definición de pipelines.
//!
//! Todas las variantes son condiciones locales y recuperables: describen un
//! input inválido del caller y nunca se reintentan. Una operación que falla
//! deja intacto el documento previo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("unknown step type: {0}")] UnknownStepType(String),
    #[error("step not found: {0}")] StepNotFound(String),
    #[error("index {index} out of range (len {len})")] IndexOutOfRange { index: usize, len: usize },
    #[error("duplicate step id: {0}")] DuplicateStepId(String),
    #[error("step {0} cannot hold substeps")] NotAContainer(String),
    #[error("invalid config: {0}")] InvalidConfig(String),
    #[error("serialization: {0}")] Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
