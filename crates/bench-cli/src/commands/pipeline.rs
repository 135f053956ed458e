//! Edición de documentos de pipeline guardados como JSON.
//!
//! Cada comando abre el documento en un `PipelineEditor`, aplica una
//! edición y lo reescribe completo.

use std::path::Path;

use anyhow::{bail, Context, Result};
use bench_core::{default_document, PipelineDocument, PipelineEditor, StepId};
use serde_json::{Map, Value};
use tracing::info;

use crate::cli::{AddArgs, DocumentArgs, NewArgs, PipelineCommand, RemoveArgs, ReorderArgs, SetConfigArgs};
use crate::util::{print_json, read_json, write_json_pretty};

pub fn run(command: PipelineCommand) -> Result<()> {
    match command {
        PipelineCommand::New(args) => new(args),
        PipelineCommand::Show(args) => show(args),
        PipelineCommand::Add(args) => add(args),
        PipelineCommand::Remove(args) => remove(args),
        PipelineCommand::Reorder(args) => reorder(args),
        PipelineCommand::SetConfig(args) => set_config(args),
    }
}

fn open(path: &Path) -> Result<PipelineEditor> {
    let document: PipelineDocument = read_json(path)?;
    let mut editor = PipelineEditor::default();
    editor.load(document);
    Ok(editor)
}

fn save(path: &Path, editor: &PipelineEditor) -> Result<()> {
    if !editor.is_dirty() {
        info!(path = %path.display(), "no changes");
        return Ok(());
    }
    write_json_pretty(path, editor.document())?;
    info!(path = %path.display(), steps = editor.document().all_steps().len(), "document written");
    Ok(())
}

fn new(args: NewArgs) -> Result<()> {
    if args.document.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.document.display());
    }
    let mut document = default_document();
    if let Some(name) = args.name {
        document = document.with_name(name);
    }
    write_json_pretty(&args.document, &document)?;
    print_json(&document)
}

fn show(args: DocumentArgs) -> Result<()> {
    let editor = open(&args.document)?;
    print_json(editor.document())
}

fn add(args: AddArgs) -> Result<()> {
    let mut editor = open(&args.document)?;
    editor.start_drag(args.step_type);
    let inserted = match (args.into, args.at) {
        (Some(parent), _) => editor.drop_into(&StepId::new(parent))?,
        (None, Some(index)) => editor.drop_at(index)?,
        (None, None) => editor.drop_on_document(),
    };
    let id = inserted.context("palette drop did not insert a step")?;
    info!(step = %id, kind = %args.step_type, "step added");
    save(&args.document, &editor)?;
    print_json(&editor.document().step(&id))
}

fn remove(args: RemoveArgs) -> Result<()> {
    let mut editor = open(&args.document)?;
    let id = StepId::new(args.step);
    if !editor.document().contains(&id) {
        info!(step = %id, "step not present, nothing to remove");
    }
    editor.remove_step(&id);
    save(&args.document, &editor)?;
    print_json(editor.document())
}

fn reorder(args: ReorderArgs) -> Result<()> {
    let mut editor = open(&args.document)?;
    editor.start_step_drag(args.from)?;
    editor.drag_over(args.to)?;
    editor.drop_on_document();
    save(&args.document, &editor)?;
    print_json(editor.document())
}

fn set_config(args: SetConfigArgs) -> Result<()> {
    let mut editor = open(&args.document)?;
    let patch: Map<String, Value> = match serde_json::from_str(&args.patch).context("--patch must be JSON")? {
        Value::Object(map) => map,
        other => bail!("--patch must be a JSON object, got {other}"),
    };
    let id = StepId::new(args.step);
    editor.update_step_config(&id, &patch)?;
    save(&args.document, &editor)?;
    print_json(&editor.document().step(&id))
}
