//! Texto canónico sobre el que se calcula el fingerprint de un documento.
//!
//! El editor decide si hay cambios sin guardar comparando el fingerprint
//! actual con el del último guardado. Con `preserve_order` los mapas
//! (`config`, `extra`, parámetros globales) recuerdan el orden en que se
//! leyeron o se parchearon sus claves, y ese orden no es un cambio: por eso
//! las claves se ordenan y no se emiten espacios. El orden de los arrays sí
//! se respeta, porque el orden de `steps` y `substeps` es dato.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let tree: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", quote(k), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

// Serializar un &str no falla.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}
