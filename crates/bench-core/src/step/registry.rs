//! Registro de tipos de step: esquema de campos y valores por defecto.
//!
//! El registro es puro y sin estado. Los esquemas se construyen una sola vez
//! (lazy) y se comparten; los defaults se construyen en cada llamada para que
//! dos steps nunca compartan la misma configuración.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::config::{ClassificationConfig, CustomConfig, EmbeddingConfig, ExtractionConfig, GenerationConfig, PhaseConfig,
                    RerankConfig, RetrievalConfig, RoutingConfig, StepConfig, ToolCallingConfig};
use super::tag::StepTypeTag;
use crate::errors::CoreError;

/// Tipo de un campo de configuración.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Integer,
    Number,
    Text,
    TextList,
}

/// Un campo declarado por el esquema de un tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Esquema de configuración de un tag: los campos que se interpretan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSchema {
    pub tag: StepTypeTag,
    pub fields: Vec<FieldSpec>,
}

impl StepSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

fn schema(tag: StepTypeTag, fields: &[(&'static str, FieldKind)]) -> StepSchema {
    StepSchema { tag,
                 fields: fields.iter().map(|&(name, kind)| FieldSpec { name, kind }).collect() }
}

static SCHEMAS: Lazy<IndexMap<StepTypeTag, StepSchema>> = Lazy::new(|| {
    use FieldKind::*;
    let all = [schema(StepTypeTag::Generation, &[("metric", Text), ("maxTokens", Integer), ("datasetRef", Text)]),
               schema(StepTypeTag::Retrieval, &[("rerankTopK", Integer), ("vectorStoreKind", Text), ("metric", Text)]),
               schema(StepTypeTag::Embedding, &[("strategy", Text), ("dimensions", Integer), ("vectorStoreKind", Text)]),
               schema(StepTypeTag::Custom, &[("scriptPath", Text), ("arguments", TextList)]),
               schema(StepTypeTag::ToolCalling, &[("toolSchemaUrl", Text), ("metric", Text)]),
               schema(StepTypeTag::Rerank, &[("topN", Integer), ("threshold", Number)]),
               schema(StepTypeTag::Extraction,
                      &[("sourcePath", Text), ("docType", Text), ("chunkSize", Integer), ("overlap", Integer)]),
               schema(StepTypeTag::Routing, &[("strategy", Text), ("routes", TextList)]),
               schema(StepTypeTag::Classification, &[("labels", TextList), ("threshold", Number)]),
               schema(StepTypeTag::Phase, &[])];
    all.into_iter().map(|s| (s.tag, s)).collect()
});

/// Registro de tipos de step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepTypeRegistry;

impl StepTypeRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Tags registrados, en orden de paleta.
    pub fn tags(&self) -> impl Iterator<Item = StepTypeTag> + '_ {
        SCHEMAS.keys().copied()
    }

    /// Resuelve un nombre de tag (canónico o heredado).
    pub fn resolve(&self, name: &str) -> Result<StepTypeTag, CoreError> {
        let tag: StepTypeTag = name.parse()?;
        if SCHEMAS.contains_key(&tag) {
            Ok(tag)
        } else {
            Err(CoreError::UnknownStepType(name.to_string()))
        }
    }

    /// Esquema de un tag del conjunto cerrado.
    pub fn schema_for(&self, tag: StepTypeTag) -> &'static StepSchema {
        // Cada variante de StepTypeTag tiene su entrada en SCHEMAS.
        &SCHEMAS[&tag]
    }

    /// Esquema a partir del nombre; `UnknownStepType` fuera del conjunto.
    pub fn schema_for_name(&self, name: &str) -> Result<&'static StepSchema, CoreError> {
        self.resolve(name).map(|tag| self.schema_for(tag))
    }

    /// Configuración por defecto de `tag`. Cada llamada devuelve un valor
    /// nuevo e independiente.
    pub fn defaults_for(&self, tag: StepTypeTag) -> StepConfig {
        match tag {
            StepTypeTag::Generation => StepConfig::Generation(GenerationConfig { metric: Some("Throughput".into()),
                                                                                 ..Default::default() }),
            StepTypeTag::Retrieval => StepConfig::Retrieval(RetrievalConfig { rerank_top_k: Some(5),
                                                                              vector_store_kind: Some("ChromaDB".into()),
                                                                              metric: Some("Semantic".into()),
                                                                              ..Default::default() }),
            StepTypeTag::Embedding => StepConfig::Embedding(EmbeddingConfig { strategy: Some("Dense".into()),
                                                                              dimensions: Some(768),
                                                                              vector_store_kind: Some("ChromaDB".into()),
                                                                              ..Default::default() }),
            StepTypeTag::Custom => StepConfig::Custom(CustomConfig::default()),
            StepTypeTag::ToolCalling => StepConfig::ToolCalling(ToolCallingConfig { metric: Some("FunctionCallValidity".into()),
                                                                                    ..Default::default() }),
            StepTypeTag::Rerank => StepConfig::Rerank(RerankConfig { top_n: Some(10), ..Default::default() }),
            StepTypeTag::Extraction => StepConfig::Extraction(ExtractionConfig { doc_type: Some("PDF".into()),
                                                                                 chunk_size: Some(512),
                                                                                 overlap: Some(50),
                                                                                 ..Default::default() }),
            StepTypeTag::Routing => StepConfig::Routing(RoutingConfig { strategy: Some("Semantic".into()),
                                                                        ..Default::default() }),
            StepTypeTag::Classification => StepConfig::Classification(ClassificationConfig { threshold: Some(0.5),
                                                                                             ..Default::default() }),
            StepTypeTag::Phase => StepConfig::Phase(PhaseConfig::default()),
        }
    }
}
