use serde_json::{json, Map, Value};
use tracing::warn;

use super::PatchGenerator;
use crate::fixes::builder::SecurityFix;
use crate::fixes::platform::{FrameworkConfig, Platform};

const CATCH_ALL: &str = "/(.*)";

/// `vercel.json` with a catch-all `headers` route. Existing JSON is parsed
/// (key order preserved) and merged; unparsable content is replaced.
pub struct VercelGenerator;

fn header_objects(fixes: &[SecurityFix]) -> Vec<Value> {
    fixes
        .iter()
        .map(|f| json!({ "key": f.header, "value": f.value }))
        .collect()
}

fn upsert(list: &mut Vec<Value>, fix: &SecurityFix) {
    let same_key = |v: &Value| {
        v.get("key")
            .and_then(Value::as_str)
            .map(|k| k.eq_ignore_ascii_case(&fix.header))
            .unwrap_or(false)
    };
    let entry = json!({ "key": fix.header, "value": fix.value });
    match list.iter_mut().find(|v| same_key(v)) {
        Some(slot) => *slot = entry,
        None => list.push(entry),
    }
}

fn merge(mut root: Map<String, Value>, fixes: &[SecurityFix]) -> Value {
    let routes = root
        .entry("headers")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !routes.is_array() {
        *routes = Value::Array(Vec::new());
    }
    if let Value::Array(routes) = routes {
        let catch_all = routes.iter().position(|r| {
            r.get("source").and_then(Value::as_str) == Some(CATCH_ALL)
                && r.get("headers").map(Value::is_array).unwrap_or(false)
        });
        match catch_all {
            Some(i) => {
                if let Some(list) = routes[i].get_mut("headers").and_then(Value::as_array_mut) {
                    for fix in fixes {
                        upsert(list, fix);
                    }
                }
            }
            None => routes.push(json!({ "source": CATCH_ALL, "headers": header_objects(fixes) })),
        }
    }
    Value::Object(root)
}

impl PatchGenerator for VercelGenerator {
    fn platform(&self) -> Platform {
        Platform::Vercel
    }

    fn generate(&self, existing: &FrameworkConfig, fixes: &[SecurityFix]) -> String {
        let root = match existing.existing().map(serde_json::from_str::<Value>) {
            Some(Ok(Value::Object(map))) => map,
            Some(Ok(_)) | Some(Err(_)) => {
                warn!(file = %existing.config_file, "existing vercel config is not a JSON object, replacing it");
                Map::new()
            }
            None => Map::new(),
        };
        let doc = merge(root, fixes);
        let mut out = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string());
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::generators::test_support::{fix, sample_fixes};

    #[test]
    fn fresh_file_parses() {
        let out = VercelGenerator.generate(&FrameworkConfig::new(Platform::Vercel), &sample_fixes());
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["headers"][0]["source"], "/(.*)");
        assert_eq!(v["headers"][0]["headers"][1]["key"], "X-Frame-Options");
        assert_eq!(v["headers"][0]["headers"][1]["value"], "DENY");
    }

    #[test]
    fn merges_into_existing_catch_all() {
        let existing = r#"{"cleanUrls": true, "headers": [{"source": "/(.*)", "headers": [{"key": "X-Custom", "value": "1"}, {"key": "x-frame-options", "value": "SAMEORIGIN"}]}]}"#;
        let cfg = FrameworkConfig::with_content(Platform::Vercel, existing);
        let out = VercelGenerator.generate(&cfg, &[fix("X-Frame-Options", "DENY")]);
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["cleanUrls"], true);
        let list = v["headers"][0]["headers"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["key"], "X-Custom");
        assert_eq!(list[1]["value"], "DENY");
        assert!(out.find("cleanUrls").unwrap() < out.find("\"headers\"").unwrap());
    }

    #[test]
    fn garbage_is_replaced() {
        let cfg = FrameworkConfig::with_content(Platform::Vercel, "{ not json");
        let out = VercelGenerator.generate(&cfg, &sample_fixes());
        assert!(serde_json::from_str::<Value>(&out).is_ok());
    }
}
