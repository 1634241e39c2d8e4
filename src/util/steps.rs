use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct StepEntry {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    expected: Option<Value>,
}

/// Text for a step field. Strings are used as-is, null is empty, and any
/// other value keeps its JSON rendering.
fn field_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Render TestRail steps as plain text for the Azure DevOps steps field.
///
/// A serialized list of `{content, expected}` entries becomes numbered
/// `Step N:` / `Expected:` lines. Anything that doesn't parse as such a list
/// is passed through untouched.
pub fn format_steps(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if !raw.starts_with('[') {
        return raw.to_string();
    }

    let entries: Vec<StepEntry> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(_) => return raw.to_string(),
    };

    let mut lines = Vec::with_capacity(entries.len() * 2);
    for (i, entry) in entries.into_iter().enumerate() {
        lines.push(format!("Step {}: {}", i + 1, field_text(entry.content)));
        let expected = field_text(entry.expected);
        if !expected.is_empty() {
            lines.push(format!("Expected: {expected}"));
        }
    }
    lines.join("\n")
}
