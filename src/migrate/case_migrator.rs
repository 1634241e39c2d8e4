use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::error::MigrationError;
use crate::model::case::{map_priority, AutomationStatus, Case};
use crate::model::work_item::{DestinationWorkItem, TEST_CASE_TYPE};
use crate::providers::DestinationSystem;
use crate::util::steps::format_steps;

#[derive(Debug)]
pub enum CaseOutcome {
    /// The work item exists. `link_error` is set when it could not be added
    /// to its suite.
    Created {
        work_item_id: u64,
        link_error: Option<MigrationError>,
    },
    SkippedDuplicate,
    Failed(MigrationError),
}

/// Build the Azure DevOps test case for a TestRail case.
pub fn build_work_item(case: &Case) -> DestinationWorkItem {
    let automation = AutomationStatus::from_source(case.automation_status);
    DestinationWorkItem {
        title: case.title.clone(),
        description: compose_description(case, automation),
        steps: format_steps(&case.raw_steps()),
        priority: map_priority(case.priority_rank),
        tags: automation.tag(),
    }
}

/// Rich-text description: preconditions, expected result, automation status,
/// estimate, references. Empty parts are left out, except the automation
/// status which is always present.
pub fn compose_description(case: &Case, automation: AutomationStatus) -> String {
    let mut parts = Vec::new();
    if let Some(pre) = non_empty(&case.preconditions) {
        parts.push(format!("<b>Prerequisites:</b><br>{pre}"));
    }
    if let Some(expected) = non_empty(&case.expected_result) {
        parts.push(format!("<b>Expected Result:</b><br>{expected}"));
    }
    parts.push(format!("<b>Automation Status:</b> {automation}"));
    if let Some(estimate) = non_empty(&case.estimate) {
        parts.push(format!("<b>Estimate:</b> {estimate}"));
    }
    if let Some(refs) = non_empty(&case.external_references) {
        parts.push(format!("<b>References:</b> {refs}"));
    }
    parts.join("<br><br>")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Create one TestRail case as a test case work item and add it to `suite_id`.
///
/// The title is claimed in `added_titles` before any request goes out, so a
/// later case with the same title is skipped even if this one fails.
pub async fn migrate_case(
    dest: &dyn DestinationSystem,
    added_titles: &mut HashSet<String>,
    case: &Case,
    suite_id: u64,
) -> CaseOutcome {
    if !added_titles.insert(case.title.clone()) {
        warn!(case_id = case.id, title = %case.title, "skipping duplicate test case");
        return CaseOutcome::SkippedDuplicate;
    }

    let work_item = build_work_item(case);
    info!(case_id = case.id, title = %case.title, "creating test case");
    debug!(
        case_id = case.id,
        case_type = ?case.case_type,
        template = ?case.template,
        milestone = ?case.milestone,
        "source fields without a destination field"
    );

    let created = match dest.create_work_item(&work_item.to_patch_document()).await {
        Ok(created) => created,
        Err(e) => {
            error!(
                case_id = case.id,
                title = %case.title,
                error = %e,
                "failed to create work item"
            );
            return CaseOutcome::Failed(e);
        }
    };

    if created.work_item_type != TEST_CASE_TYPE {
        let e = MigrationError::TypeMismatch {
            work_item_id: created.id,
            expected: TEST_CASE_TYPE.into(),
            actual: created.work_item_type,
        };
        error!(case_id = case.id, error = %e, "created item is not a test case");
        return CaseOutcome::Failed(e);
    }

    match dest.work_item_url(created.id) {
        Some(url) => info!(work_item_id = created.id, %url, "created test case"),
        None => info!(work_item_id = created.id, "created test case"),
    }

    let link_error = match dest.add_case_to_suite(suite_id, created.id).await {
        Ok(()) => {
            info!(work_item_id = created.id, suite_id, "added test case to suite");
            None
        }
        Err(e) => {
            warn!(
                work_item_id = created.id,
                suite_id,
                error = %e,
                "test case created but not added to suite"
            );
            Some(e)
        }
    };

    CaseOutcome::Created {
        work_item_id: created.id,
        link_error,
    }
}
