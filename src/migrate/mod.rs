pub mod case_migrator;
pub mod journal;
pub mod reconciler;
pub mod source_reader;
pub mod suite_index;

use std::collections::HashSet;
use std::fmt;

use tracing::{error, info};

use crate::error::MigrationError;
use crate::providers::{DestinationSystem, SourceSystem};
use case_migrator::{migrate_case, CaseOutcome};
use journal::{Journal, JournalEvent};
use reconciler::{resolve_suite, ResolvedSuite};
use suite_index::{build_index, SuiteIndex};

/// Mutable state for a single run. Nothing here outlives the process.
pub struct MigrationState {
    pub suites: SuiteIndex,
    pub added_titles: HashSet<String>,
    pub summary: RunSummary,
}

impl MigrationState {
    pub fn new(suites: SuiteIndex) -> Self {
        Self {
            suites,
            added_titles: HashSet::new(),
            summary: RunSummary::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sections_total: usize,
    /// Sections that ended up with a suite, new or existing.
    pub sections_processed: usize,
    pub sections_skipped: usize,
    pub suites_created: usize,
    pub cases_total: usize,
    pub created: usize,
    pub skipped_duplicates: usize,
    pub failed: usize,
    /// Created work items that could not be added to their suite.
    pub unlinked: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration complete.")?;
        writeln!(
            f,
            "  Sections processed:      {} of {} ({} skipped, {} new suites)",
            self.sections_processed, self.sections_total, self.sections_skipped, self.suites_created
        )?;
        writeln!(f, "  Test cases found:        {}", self.cases_total)?;
        writeln!(f, "  Test cases created:      {}", self.created)?;
        writeln!(f, "  Duplicates skipped:      {}", self.skipped_duplicates)?;
        writeln!(f, "  Test cases failed:       {}", self.failed)?;
        write!(f, "  Created but not linked:  {}", self.unlinked)
    }
}

/// Run a full migration of every source section into suites below
/// `root_suite_id`.
///
/// Only a failure to read the source aborts the run. Suite and case failures
/// are logged, journaled and counted, and the loop moves on.
pub async fn run(
    source: &dyn SourceSystem,
    dest: &dyn DestinationSystem,
    root_suite_id: u64,
    journal: &Journal,
) -> Result<RunSummary, MigrationError> {
    info!(source = source.name(), destination = dest.name(), "starting migration");
    journal.record(JournalEvent::new("run_started").suite(root_suite_id));

    let data = match source_reader::load(source).await {
        Ok(data) => data,
        Err(e) => {
            journal.record(JournalEvent::new("run_aborted").message(&e));
            return Err(e);
        }
    };

    info!(root_suite_id, "indexing existing test suites");
    let suites = build_index(dest, root_suite_id).await;
    if suites.is_empty() {
        info!(root_suite_id, "no existing suites below root");
    } else {
        info!(count = suites.len(), "found existing suites");
    }

    let mut state = MigrationState::new(suites);
    state.summary.sections_total = data.sections.len();
    state.summary.cases_total = data.case_count();

    for section in &data.sections {
        info!(
            section = %section.name,
            section_id = section.id,
            parent_section_id = ?section.parent_section_id,
            "processing section"
        );

        let resolved = resolve_suite(dest, &mut state.suites, &section.name, root_suite_id).await;
        let suite_id = match resolved {
            Ok(resolved) => {
                let event = match resolved {
                    ResolvedSuite::Existing(_) => "suite_reused",
                    ResolvedSuite::Created(_) => {
                        state.summary.suites_created += 1;
                        "suite_created"
                    }
                };
                journal.record(
                    JournalEvent::new(event)
                        .section(&section.name)
                        .suite(resolved.id()),
                );
                resolved.id()
            }
            Err(e) => {
                error!(section = %section.name, "no suite for section, skipping its test cases");
                journal.record(
                    JournalEvent::new("suite_failed")
                        .section(&section.name)
                        .message(&e),
                );
                state.summary.sections_skipped += 1;
                continue;
            }
        };
        state.summary.sections_processed += 1;

        let cases = data.cases_for(section.id);
        info!(section = %section.name, count = cases.len(), "migrating test cases");

        for case in cases {
            let outcome = migrate_case(dest, &mut state.added_titles, case, suite_id).await;
            let base = |event: &str| {
                JournalEvent::new(event)
                    .section(&section.name)
                    .suite(suite_id)
                    .case(case.id, &case.title)
            };
            match outcome {
                CaseOutcome::Created {
                    work_item_id,
                    link_error: None,
                } => {
                    state.summary.created += 1;
                    journal.record(base("case_created").work_item(work_item_id));
                }
                CaseOutcome::Created {
                    work_item_id,
                    link_error: Some(e),
                } => {
                    state.summary.created += 1;
                    state.summary.unlinked += 1;
                    journal.record(base("case_unlinked").work_item(work_item_id).message(&e));
                }
                CaseOutcome::SkippedDuplicate => {
                    state.summary.skipped_duplicates += 1;
                    journal.record(base("case_skipped_duplicate"));
                }
                CaseOutcome::Failed(e) => {
                    state.summary.failed += 1;
                    let mut event = base("case_failed").message(&e);
                    if let MigrationError::TypeMismatch { work_item_id, .. } = e {
                        event = event.work_item(work_item_id);
                    }
                    journal.record(event);
                }
            }
        }
    }

    let summary = state.summary;
    info!(
        sections = summary.sections_processed,
        created = summary.created,
        skipped = summary.skipped_duplicates,
        failed = summary.failed,
        unlinked = summary.unlinked,
        "migration complete"
    );
    journal.record(JournalEvent::new("run_finished").message(format!(
        "created {}, skipped {}, failed {}",
        summary.created, summary.skipped_duplicates, summary.failed
    )));
    Ok(summary)
}
