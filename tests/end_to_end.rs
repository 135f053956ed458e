//! Flujo completo: se arma un pipeline, se "ejecuta" fuera de este crate y
//! sus resultados vuelven como mediciones con desglose por step.

use benchflow::analytics::{aggregate, segment_breakdown, summarize, Segment, Timestamp};
use benchflow::pipeline::{InMemoryPipelineRepository, PipelineRepository, StepId};
use benchflow::{MeasurementRecord, PipelineEditor, SeriesFilter, StepTypeTag};
use serde_json::json;

#[test]
fn pipeline_scenario_keeps_retrieval_step() {
    let mut editor = PipelineEditor::default();
    let retrieval = editor.insert_step(StepTypeTag::Retrieval, None);
    let generation = editor.insert_step(StepTypeTag::Generation, None);
    editor.update_step_config(&retrieval, json!({"rerankTopK": 5}).as_object().unwrap())
          .unwrap();
    editor.reorder(0, 1).unwrap();
    let order: Vec<_> = editor.document().steps().iter().map(|s| s.type_tag()).collect();
    assert_eq!(order, vec![StepTypeTag::Generation, StepTypeTag::Retrieval]);
    editor.remove_step(&generation);

    let doc = editor.snapshot();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.steps()[0].id, retrieval);
    assert_eq!(doc.steps()[0].type_tag(), StepTypeTag::Retrieval);
    assert_eq!(doc.steps()[0].config.as_retrieval().and_then(|c| c.rerank_top_k), Some(5));
}

#[test]
fn results_of_a_saved_pipeline_feed_the_trend_panel() {
    let repo = InMemoryPipelineRepository::new();
    let mut editor = PipelineEditor::default();
    let embed = editor.insert_step(StepTypeTag::Embedding, None);
    let generate = editor.insert_step(StepTypeTag::Generation, None);
    let saved = repo.save(editor.document());
    let doc = repo.load(saved.id()).unwrap();

    let segment_for = |id: &StepId, ms: f64| {
        let step = doc.step(id).unwrap();
        Segment { step_id: step.id.to_string(),
                  step_name: step.display_name.clone(),
                  type_tag: step.type_tag(),
                  duration_ms: ms,
                  score: None,
                  notes: None }
    };
    let run = |day: &str, latency: f64, tps: f64| {
        MeasurementRecord::new("saul-7b", "LegalBench", Timestamp::parse(day).unwrap(), latency)
            .with_throughput(tps)
            .with_segments(vec![segment_for(&embed, latency * 0.02), segment_for(&generate, latency * 0.98)])
    };
    let records = vec![run("2024-03-02", 800.0, 40.0), run("2024-03-01", 1000.0, 30.0)];

    let rows = aggregate(&records, &SeriesFilter::all());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("saul-7b_lat"), Some(1000.0));
    assert_eq!(rows[1].get("saul-7b_tps"), Some(40.0));

    let summary = summarize(&records, &Default::default()).unwrap();
    assert_eq!(summary.peak_throughput, Some(40.0));
    assert_eq!(summary.mean_latency, 900.0);

    let shares = segment_breakdown(&records[0]);
    assert_eq!(shares[0].type_tag, StepTypeTag::Embedding);
    assert_eq!(shares[0].display_percent, 5.0);
    assert!(shares[1].percent > 97.0);
}
