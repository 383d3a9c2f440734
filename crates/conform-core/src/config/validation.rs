//! Config validation - warns about unknown fields

use serde_json::{Map, Value};
use tracing::warn;

const SECTIONS: &[&str] = &["tester", "adapters"];
const TESTER_FIELDS: &[&str] = &["download", "color", "searchLimit", "emptyQuery"];

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for path in unknown_fields(&root) {
        warn!("Unknown config field in {config_name}: {path}");
    }
}

/// Dotted paths of keys the config schema does not know, sorted.
/// Adapter settings are free-form and never reported.
fn unknown_fields(root: &Map<String, Value>) -> Vec<String> {
    let mut unknown: Vec<String> = root
        .keys()
        .filter(|key| !SECTIONS.contains(&key.as_str()))
        .cloned()
        .collect();

    if let Some(Value::Object(tester)) = root.get("tester") {
        unknown.extend(
            tester
                .keys()
                .filter(|key| !TESTER_FIELDS.contains(&key.as_str()))
                .map(|key| format!("tester.{key}")),
        );
    }

    unknown.sort();
    unknown
}
