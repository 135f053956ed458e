//! Tag de tipo de step (conjunto cerrado).
//!
//! El tag decide qué registro de configuración lleva un step. El conjunto
//! sólo crece agregando una variante nueva más su entrada en el registro;
//! nunca se infiere a partir de los datos. `Phase` es el único tag
//! contenedor: agrupa substeps y no tiene campos propios.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepTypeTag {
    Generation,
    Retrieval,
    Embedding,
    Custom,
    ToolCalling,
    Rerank,
    Extraction,
    Routing,
    Classification,
    Phase,
}

impl StepTypeTag {
    /// Todos los tags en orden de declaración (orden de la paleta).
    pub const ALL: [StepTypeTag; 10] = [StepTypeTag::Generation,
                                       StepTypeTag::Retrieval,
                                       StepTypeTag::Embedding,
                                       StepTypeTag::Custom,
                                       StepTypeTag::ToolCalling,
                                       StepTypeTag::Rerank,
                                       StepTypeTag::Extraction,
                                       StepTypeTag::Routing,
                                       StepTypeTag::Classification,
                                       StepTypeTag::Phase];

    /// Nombre canónico usado en el intercambio JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepTypeTag::Generation => "Generation",
            StepTypeTag::Retrieval => "Retrieval",
            StepTypeTag::Embedding => "Embedding",
            StepTypeTag::Custom => "Custom",
            StepTypeTag::ToolCalling => "ToolCalling",
            StepTypeTag::Rerank => "Rerank",
            StepTypeTag::Extraction => "Extraction",
            StepTypeTag::Routing => "Routing",
            StepTypeTag::Classification => "Classification",
            StepTypeTag::Phase => "Phase",
        }
    }

    /// Sólo un contenedor puede llevar substeps.
    pub fn is_container(&self) -> bool {
        matches!(self, StepTypeTag::Phase)
    }

    /// Nombres heredados del panel original que se aceptan al leer.
    fn from_legacy(name: &str) -> Option<Self> {
        match name {
            "Tool Calling" | "ToolUse" => Some(StepTypeTag::ToolCalling),
            "RAG" => Some(StepTypeTag::Retrieval),
            "Ingestion" => Some(StepTypeTag::Extraction),
            "ColBERT" => Some(StepTypeTag::Rerank),
            _ => None,
        }
    }
}

impl FromStr for StepTypeTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepTypeTag::ALL.iter()
                        .copied()
                        .find(|t| t.as_str() == s)
                        .or_else(|| StepTypeTag::from_legacy(s))
                        .ok_or_else(|| CoreError::UnknownStepType(s.to_string()))
    }
}

impl fmt::Display for StepTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepTypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepTypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
