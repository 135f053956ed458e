//! Utilidades para fusionar objetos JSON de forma determinista.
//!
//! Los patches del editor (campos de un step, su config, los parámetros
//! globales) se aplican con un merge "shallow": las claves del patch
//! reemplazan a las del objeto base y el resto queda intacto. Los objetos
//! anidados no se fusionan, se reemplazan completos.

use serde_json::{Map, Value};

/// Merge shallow: keys from `b` override keys from `a`. Conserva el orden
/// de `a` y agrega al final las claves nuevas de `b`.
pub fn merge_maps(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = a.clone();
    for (k, v) in b.iter() {
        out.insert(k.clone(), v.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn merge_shallow_overrides_keys() {
        let a = obj(json!({"x": 1, "y": {"z": 3}, "keep": "a"}));
        let b = obj(json!({"x": 2, "y": "replaced", "new": true}));

        let out = merge_maps(&a, &b);

        assert_eq!(out["x"], json!(2));
        assert_eq!(out["y"], json!("replaced"));
        assert_eq!(out["keep"], json!("a"));
        assert_eq!(out["new"], json!(true));
    }

    #[test]
    fn merge_keeps_base_key_order() {
        let a = obj(json!({"first": 1, "second": 2}));
        let b = obj(json!({"third": 3, "first": 10}));
        let out = merge_maps(&a, &b);
        let keys: Vec<&String> = out.keys().collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }
}
