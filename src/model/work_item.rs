use serde::Serialize;
use serde_json::Value;

pub const TEST_CASE_TYPE: &str = "Test Case";

pub const FIELD_TITLE: &str = "/fields/System.Title";
pub const FIELD_DESCRIPTION: &str = "/fields/System.Description";
pub const FIELD_PRIORITY: &str = "/fields/Microsoft.VSTS.Common.Priority";
pub const FIELD_STEPS: &str = "/fields/Microsoft.VSTS.TCM.Steps";
pub const FIELD_TAGS: &str = "/fields/System.Tags";

/// One entry of a JSON Patch document sent to the work item API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn add(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: "add".into(),
            path: path.into(),
            value: value.into(),
        }
    }
}

/// The Azure DevOps test case built from a TestRail case, before it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationWorkItem {
    pub title: String,
    pub description: String,
    pub steps: String,
    pub priority: u8,
    pub tags: String,
}

impl DestinationWorkItem {
    /// Field order is fixed: title, description, priority, steps (only when
    /// present), tags.
    pub fn to_patch_document(&self) -> Vec<PatchOperation> {
        let mut ops = vec![
            PatchOperation::add(FIELD_TITLE, self.title.as_str()),
            PatchOperation::add(FIELD_DESCRIPTION, self.description.as_str()),
            PatchOperation::add(FIELD_PRIORITY, self.priority),
        ];
        if !self.steps.is_empty() {
            ops.push(PatchOperation::add(FIELD_STEPS, self.steps.as_str()));
        }
        ops.push(PatchOperation::add(FIELD_TAGS, self.tags.as_str()));
        ops
    }
}

/// What the work item API reports back after a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedWorkItem {
    pub id: u64,
    pub work_item_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(steps: &str) -> DestinationWorkItem {
        DestinationWorkItem {
            title: "Valid login".into(),
            description: "<b>Automation Status:</b> Automated".into(),
            steps: steps.into(),
            priority: 2,
            tags: "AutomationStatus:Automated".into(),
        }
    }

    #[test]
    fn patch_document_omits_empty_steps() {
        let paths: Vec<String> = item("")
            .to_patch_document()
            .into_iter()
            .map(|op| op.path)
            .collect();
        assert_eq!(paths, [FIELD_TITLE, FIELD_DESCRIPTION, FIELD_PRIORITY, FIELD_TAGS]);
    }

    #[test]
    fn patch_document_places_steps_before_tags() {
        let ops = item("Step 1: click").to_patch_document();
        assert_eq!(ops[3].path, FIELD_STEPS);
        assert_eq!(ops[4].path, FIELD_TAGS);
        assert!(ops.iter().all(|op| op.op == "add"));
    }

    #[test]
    fn patch_operation_serializes_as_json_patch() {
        let json = serde_json::to_value(PatchOperation::add(FIELD_PRIORITY, 2u8)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "add",
                "path": "/fields/Microsoft.VSTS.Common.Priority",
                "value": 2
            })
        );
    }
}
