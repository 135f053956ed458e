use bench_core::hashing::hash_value;
use bench_core::{default_document, PipelineDocument, StepTypeTag};
use serde_json::json;

#[test]
fn fingerprint_ignores_key_order() {
    let a: PipelineDocument = serde_json::from_value(json!({
        "id": "cfg-9", "name": "order", "backendKind": "pytest", "targetHardwareKind": "CPU",
        "steps": [{"id": "x", "typeTag": "Rerank", "displayName": "rerank", "config": {"topN": 3, "threshold": 0.2}}]
    })).unwrap();
    let b: PipelineDocument = serde_json::from_value(json!({
        "steps": [{"config": {"threshold": 0.2, "topN": 3}, "displayName": "rerank", "typeTag": "Rerank", "id": "x"}],
        "targetHardwareKind": "CPU", "backendKind": "pytest", "name": "order", "id": "cfg-9"
    })).unwrap();
    let fp = a.fingerprint().unwrap();
    // blake3 en hex
    assert_eq!(fp.len(), 64);
    assert_eq!(fp, b.fingerprint().unwrap());
    assert_eq!(fp, hash_value(&serde_json::to_value(&b).unwrap()));
}

#[test]
fn any_edit_changes_the_fingerprint() {
    let doc = default_document();
    let edited = doc.insert_step(StepTypeTag::Classification, None);
    assert_ne!(doc.fingerprint().unwrap(), edited.fingerprint().unwrap());
    assert_eq!(doc.fingerprint().unwrap(), default_document().fingerprint().unwrap());
}

#[test]
fn unknown_key_order_is_clean_but_substep_order_is_not() {
    let read = |config: serde_json::Value, children: [&str; 2]| -> PipelineDocument {
        serde_json::from_value(json!({
            "id": "cfg-9", "name": "phase", "backendKind": "pytest", "targetHardwareKind": "CPU",
            "steps": [{"id": "p", "typeTag": "Phase", "displayName": "phase", "config": config,
                       "substeps": [{"id": children[0], "typeTag": "Custom", "displayName": "a", "config": {}},
                                    {"id": children[1], "typeTag": "Custom", "displayName": "a", "config": {}}]}]
        })).unwrap()
    };
    let a = read(json!({"lane": 1, "color": "red"}), ["x", "y"]);
    let b = read(json!({"color": "red", "lane": 1}), ["x", "y"]);
    let swapped = read(json!({"lane": 1, "color": "red"}), ["y", "x"]);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    assert_ne!(a.fingerprint().unwrap(), swapped.fingerprint().unwrap());
}
