use tracing::{error, info};

use super::suite_index::SuiteIndex;
use crate::error::MigrationError;
use crate::model::suite::SuiteIndexKey;
use crate::providers::DestinationSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSuite {
    Existing(u64),
    Created(u64),
}

impl ResolvedSuite {
    pub fn id(&self) -> u64 {
        match self {
            ResolvedSuite::Existing(id) | ResolvedSuite::Created(id) => *id,
        }
    }
}

/// Find the suite for a section under `parent_id`, creating it when the
/// index has nothing for the section's name.
///
/// An indexed suite is reused without touching the network. A newly created
/// suite is added to the index so later sections with the same name reuse it.
pub async fn resolve_suite(
    dest: &dyn DestinationSystem,
    index: &mut SuiteIndex,
    section_name: &str,
    parent_id: u64,
) -> Result<ResolvedSuite, MigrationError> {
    let key = SuiteIndexKey::new(section_name, parent_id);
    if let Some(id) = index.get(&key) {
        info!(section = section_name, suite_id = id, "using existing test suite");
        return Ok(ResolvedSuite::Existing(id));
    }

    info!(section = section_name, parent_id, "creating test suite");
    match dest.create_suite(section_name, parent_id).await {
        Ok(suite) => {
            info!(section = section_name, suite_id = suite.id, "created test suite");
            index.insert(key, suite.id);
            Ok(ResolvedSuite::Created(suite.id))
        }
        Err(e) => {
            error!(section = section_name, error = %e, "failed to create test suite");
            Err(e)
        }
    }
}
