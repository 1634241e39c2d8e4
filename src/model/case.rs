use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// A TestRail test case, as returned by `get_cases`.
///
/// Only `id` is strict. Every other field tolerates the odd shapes custom
/// fields take across TestRail instances: a value of the wrong type reads as
/// missing instead of failing the whole listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_id")]
    pub section_id: Option<u64>,
    #[serde(default = "untitled_case", deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default, rename = "custom_preconds", deserialize_with = "lenient_text")]
    pub preconditions: Option<String>,
    #[serde(default, rename = "custom_steps")]
    pub steps: Option<Value>,
    #[serde(default, rename = "custom_steps_separated")]
    pub steps_separated: Option<Value>,
    #[serde(default, rename = "custom_expected", deserialize_with = "lenient_text")]
    pub expected_result: Option<String>,
    #[serde(default, rename = "priority_id", deserialize_with = "lenient_int")]
    pub priority_rank: Option<i64>,
    #[serde(default, rename = "custom_case_automated", deserialize_with = "lenient_int")]
    pub automation_status: Option<i64>,
    #[serde(default, rename = "type_id", deserialize_with = "lenient_id")]
    pub case_type: Option<u64>,
    #[serde(default, rename = "template_id", deserialize_with = "lenient_id")]
    pub template: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estimate: Option<String>,
    #[serde(default, rename = "milestone_id", deserialize_with = "lenient_id")]
    pub milestone: Option<u64>,
    #[serde(default, rename = "refs", deserialize_with = "lenient_text")]
    pub external_references: Option<String>,
}

fn untitled_case() -> String {
    "Untitled Test Case".into()
}

/// Integers, numeric strings and booleans (true = 1). Anything else is None.
fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(int_value))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(int_value)
        .and_then(|n| u64::try_from(n).ok()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => untitled_case(),
    })
}

impl Case {
    /// The steps as TestRail stored them: plain text, or a serialized step
    /// list when only the separated-steps template is filled in.
    pub fn raw_steps(&self) -> String {
        match &self.steps {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(v @ Value::Array(arr)) if !arr.is_empty() => return v.to_string(),
            _ => {}
        }
        match &self.steps_separated {
            Some(v @ Value::Array(arr)) if !arr.is_empty() => v.to_string(),
            _ => String::new(),
        }
    }
}

/// Azure DevOps priority for a TestRail priority rank.
///
/// TestRail counts 1 = Low up to 4 = Critical, Azure DevOps counts
/// 1 = most urgent, so the scale is inverted. Anything else lands on 3.
pub fn map_priority(rank: Option<i64>) -> u8 {
    match rank.unwrap_or(2) {
        1 => 4,
        2 => 3,
        3 => 2,
        4 => 1,
        _ => 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStatus {
    NotAutomated,
    Automated,
    ToBeAutomated,
}

impl AutomationStatus {
    pub fn from_source(value: Option<i64>) -> Self {
        match value {
            Some(1) => AutomationStatus::Automated,
            Some(2) => AutomationStatus::ToBeAutomated,
            _ => AutomationStatus::NotAutomated,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AutomationStatus::NotAutomated => "Not Automated",
            AutomationStatus::Automated => "Automated",
            AutomationStatus::ToBeAutomated => "To Be Automated",
        }
    }

    pub fn tag(&self) -> String {
        format!("AutomationStatus:{}", self.label().replace(' ', ""))
    }
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_mapping_inverts_known_ranks() {
        assert_eq!(map_priority(Some(1)), 4);
        assert_eq!(map_priority(Some(2)), 3);
        assert_eq!(map_priority(Some(3)), 2);
        assert_eq!(map_priority(Some(4)), 1);
    }

    #[test]
    fn priority_mapping_is_order_reversing() {
        for a in 1..=4 {
            for b in 1..=4 {
                if a < b {
                    assert!(map_priority(Some(a)) > map_priority(Some(b)));
                }
            }
        }
    }

    #[test]
    fn unknown_priority_maps_to_middle() {
        for rank in [0, 5, -1, 99] {
            assert_eq!(map_priority(Some(rank)), 3, "rank {rank}");
        }
        assert_eq!(map_priority(None), 3);
    }

    #[test]
    fn automation_status_defaults_to_not_automated() {
        use AutomationStatus::*;
        assert_eq!(AutomationStatus::from_source(Some(1)), Automated);
        assert_eq!(AutomationStatus::from_source(Some(2)), ToBeAutomated);
        assert_eq!(AutomationStatus::from_source(Some(7)), NotAutomated);
        assert_eq!(AutomationStatus::from_source(None), NotAutomated);
    }

    #[test]
    fn automation_tag_strips_spaces() {
        assert_eq!(
            AutomationStatus::ToBeAutomated.tag(),
            "AutomationStatus:ToBeAutomated"
        );
        assert_eq!(
            AutomationStatus::NotAutomated.tag(),
            "AutomationStatus:NotAutomated"
        );
    }

    #[test]
    fn deserialize_case_with_nulls() {
        let json = r#"{
            "id": 101, "section_id": 10, "title": "Valid login",
            "custom_preconds": null, "custom_steps": "Open page", "custom_expected": null,
            "priority_id": 4, "custom_case_automated": null, "estimate": null, "refs": "JIRA-1"
        }"#;
        let case: Case = serde_json::from_str(json).unwrap();
        assert_eq!(case.section_id, Some(10));
        assert_eq!(case.priority_rank, Some(4));
        assert_eq!(case.automation_status, None);
        assert_eq!(case.external_references.as_deref(), Some("JIRA-1"));
        assert_eq!(case.raw_steps(), "Open page");
    }

    #[test]
    fn raw_steps_falls_back_to_separated_steps() {
        let json = r#"{
            "id": 1, "section_id": 1, "title": "t", "custom_steps": "",
            "custom_steps_separated": [{"content": "click", "expected": "page loads"}]
        }"#;
        let case: Case = serde_json::from_str(json).unwrap();
        assert_eq!(
            case.raw_steps(),
            r#"[{"content":"click","expected":"page loads"}]"#
        );
    }

    #[test]
    fn raw_steps_empty_when_absent() {
        let case: Case = serde_json::from_str(r#"{"id": 1, "section_id": null}"#).unwrap();
        assert_eq!(case.title, "Untitled Test Case");
        assert_eq!(case.raw_steps(), "");
    }

    #[test]
    fn numeric_strings_and_booleans_are_read_as_ranks() {
        let json = r#"{
            "id": 7, "section_id": "10", "title": "Checkout",
            "priority_id": "4", "custom_case_automated": true
        }"#;
        let case: Case = serde_json::from_str(json).unwrap();
        assert_eq!(case.section_id, Some(10));
        assert_eq!(case.priority_rank, Some(4));
        assert_eq!(map_priority(case.priority_rank), 1);
        assert_eq!(
            AutomationStatus::from_source(case.automation_status),
            AutomationStatus::Automated
        );
    }

    #[test]
    fn unreadable_fields_fall_back_to_defaults() {
        let json = r#"{
            "id": 8, "section_id": 10, "title": null,
            "priority_id": "high", "custom_case_automated": [1],
            "type_id": -3, "estimate": 30, "refs": {"id": 1}
        }"#;
        let case: Case = serde_json::from_str(json).unwrap();
        assert_eq!(case.title, "Untitled Test Case");
        assert_eq!(case.priority_rank, None);
        assert_eq!(map_priority(case.priority_rank), 3);
        assert_eq!(case.automation_status, None);
        assert_eq!(case.case_type, None);
        assert_eq!(case.estimate.as_deref(), Some("30"));
        assert_eq!(case.external_references.as_deref(), Some(r#"{"id":1}"#));
    }
}
