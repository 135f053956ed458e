//! Errores de la capa analítica. Todos son input inválido del caller.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AnalyticsError {
    #[error("total weight is zero, cannot normalize")] ZeroTotalWeight,
    #[error("no records match the filter")] NoRecords,
    #[error("invalid timestamp: {0}")] InvalidTimestamp(String),
}
