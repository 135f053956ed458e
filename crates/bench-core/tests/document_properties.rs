//! Propiedades del documento bajo secuencias arbitrarias de ediciones.

use std::collections::HashSet;

use bench_core::{default_document, PipelineDocument, StepId, StepPatch, StepTypeTag};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize, Option<usize>),
    Remove(usize),
    Reorder(usize, usize),
    Field(usize),
    Config(usize),
    Substep(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0..StepTypeTag::ALL.len(), proptest::option::of(0usize..8)).prop_map(|(t, at)| Op::Insert(t, at)),
                (0usize..8).prop_map(Op::Remove),
                (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Reorder(a, b)),
                (0usize..8).prop_map(Op::Field),
                (0usize..8).prop_map(Op::Config),
                (0usize..8, 0..StepTypeTag::ALL.len()).prop_map(|(p, t)| Op::Substep(p, t)),]
}

// Elige entre todos los steps, substeps incluidos.
fn id_at(doc: &PipelineDocument, pick: usize) -> Option<StepId> {
    let all = doc.all_steps();
    if all.is_empty() {
        None
    } else {
        Some(all[pick % all.len()].id.clone())
    }
}

fn phase_at(doc: &PipelineDocument, pick: usize) -> Option<StepId> {
    let phases: Vec<StepId> = doc.all_steps()
                                 .into_iter()
                                 .filter(|s| s.type_tag().is_container())
                                 .map(|s| s.id.clone())
                                 .collect();
    if phases.is_empty() {
        None
    } else {
        Some(phases[pick % phases.len()].clone())
    }
}

fn apply(doc: &PipelineDocument, op: &Op) -> PipelineDocument {
    match op {
        Op::Insert(t, at) => doc.insert_step(StepTypeTag::ALL[*t], *at),
        Op::Remove(pick) => match id_at(doc, *pick) {
            Some(id) => doc.remove_step(&id),
            None => doc.clone(),
        },
        Op::Reorder(a, b) => doc.reorder(*a, *b).unwrap_or_else(|_| doc.clone()),
        Op::Field(pick) => match id_at(doc, *pick) {
            Some(id) => doc.update_step_field(&id, &StepPatch::new().enabled(false)).unwrap(),
            None => doc.clone(),
        },
        Op::Config(pick) => match id_at(doc, *pick) {
            Some(id) => doc.update_step_config(&id, json!({"note": "edited"}).as_object().unwrap()).unwrap(),
            None => doc.clone(),
        },
        Op::Substep(pick, t) => match phase_at(doc, *pick) {
            Some(id) => doc.insert_substep(&id, StepTypeTag::ALL[*t]).unwrap(),
            None => doc.clone(),
        },
    }
}

fn ids(doc: &PipelineDocument) -> Vec<StepId> {
    doc.all_steps().iter().map(|s| s.id.clone()).collect()
}

fn build(ops: &[Op]) -> PipelineDocument {
    ops.iter().fold(default_document(), |d, o| apply(&d, o))
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn step_ids_stay_unique(ops in proptest::collection::vec(op(), 0..40)) {
        let doc = build(&ops);
        let all = ids(&doc);
        let unique: HashSet<StepId> = all.iter().cloned().collect();
        prop_assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn removal_is_idempotent(ops in proptest::collection::vec(op(), 0..20), pick in 0usize..8) {
        let doc = build(&ops);
        let id = id_at(&doc, pick).unwrap_or_else(|| StepId::new("absent"));
        let once = doc.remove_step(&id);
        prop_assert_eq!(once.remove_step(&id), once);
    }

    #[test]
    fn edits_never_move_steps(ops in proptest::collection::vec(op(), 1..20), pick in 0usize..8) {
        let doc = build(&ops).insert_step(StepTypeTag::Retrieval, None);
        let id = id_at(&doc, pick).unwrap();
        let by_field = doc.update_step_field(&id, &StepPatch::new().display_name("renamed")).unwrap();
        let by_config = doc.update_step_config(&id, json!({"metric": "ExactMatch"}).as_object().unwrap()).unwrap();
        prop_assert_eq!(ids(&by_field), ids(&doc));
        prop_assert_eq!(ids(&by_config), ids(&doc));
    }
}
