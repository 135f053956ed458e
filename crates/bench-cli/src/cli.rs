use std::path::PathBuf;

use bench_core::StepTypeTag;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bench-cli", version, about = "Benchmark pipeline definitions and result analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crear y editar documentos de pipeline (archivos JSON).
    #[command(subcommand)]
    Pipeline(PipelineCommand),
    /// Normalizar y validar pesos de fusión.
    #[command(subcommand)]
    Weights(WeightsCommand),
    /// Filas de series temporales para gráficos de tendencia.
    Trends(TrendsArgs),
    /// Throughput medio/pico y latencia media.
    Summary(SummaryArgs),
    /// Comparación direccional de dos conjuntos de métricas.
    Compare(CompareArgs),
}

#[derive(Subcommand, Debug)]
pub enum PipelineCommand {
    New(NewArgs),
    Show(DocumentArgs),
    Add(AddArgs),
    Remove(RemoveArgs),
    Reorder(ReorderArgs),
    SetConfig(SetConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Documento de pipeline (JSON).
    pub document: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    pub document: PathBuf,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    pub document: PathBuf,

    /// Tipo de step (p.ej. Retrieval, Generation).
    #[arg(long = "type")]
    pub step_type: StepTypeTag,

    /// Posición; por defecto al final.
    #[arg(long, conflicts_with = "into")]
    pub at: Option<usize>,

    /// Id de un step Phase: agrega el step al final de sus substeps.
    #[arg(long)]
    pub into: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    pub document: PathBuf,

    #[arg(long)]
    pub step: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReorderArgs {
    pub document: PathBuf,

    #[arg(long)]
    pub from: usize,

    #[arg(long)]
    pub to: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SetConfigArgs {
    pub document: PathBuf,

    #[arg(long)]
    pub step: String,

    /// Objeto JSON con los campos a cambiar.
    #[arg(long)]
    pub patch: String,
}

#[derive(Subcommand, Debug)]
pub enum WeightsCommand {
    Normalize(NormalizeArgs),
    Check(WeightsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WeightsArgs {
    /// Lista `[{slotId, targetRef, weight}]` (JSON).
    pub inputs: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    pub inputs: PathBuf,

    /// Repartir en partes iguales en vez de reescalar.
    #[arg(long, default_value_t = false)]
    pub equal: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TrendsArgs {
    /// Registros de medición (JSON).
    pub records: PathBuf,

    #[arg(long = "subject")]
    pub subjects: Vec<String>,

    #[arg(long, default_value = "All")]
    pub dataset: String,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    pub records: PathBuf,

    #[arg(long = "subject")]
    pub subjects: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Métricas de la entidad A (JSON, p.ej. `{"latencyMs": 120}`).
    pub a: PathBuf,

    pub b: PathBuf,
}
