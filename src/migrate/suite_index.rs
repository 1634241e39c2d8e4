use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::suite::{DestinationSuite, SuiteIndexKey};
use crate::providers::DestinationSystem;

/// Suites known to exist in the destination plan, keyed by normalized name
/// and parent. The first suite seen for a key wins; later ones are ignored.
#[derive(Debug, Default)]
pub struct SuiteIndex {
    suites: HashMap<SuiteIndexKey, u64>,
}

impl SuiteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SuiteIndexKey) -> Option<u64> {
        self.suites.get(key).copied()
    }

    /// Returns false and leaves the index untouched if the key is taken.
    pub fn insert(&mut self, key: SuiteIndexKey, suite_id: u64) -> bool {
        if self.suites.contains_key(&key) {
            return false;
        }
        self.suites.insert(key, suite_id);
        true
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

/// Walk the suite tree below `root_id` and index every suite found.
///
/// The walk is depth-first in listing order, using an explicit stack of
/// pending siblings rather than recursion. A child is only descended into
/// when its key was new, which also stops the walk on cycles. A listing that
/// fails contributes nothing and the walk carries on with the rest.
pub async fn build_index(dest: &dyn DestinationSystem, root_id: u64) -> SuiteIndex {
    let mut index = SuiteIndex::new();
    let mut stack: Vec<std::vec::IntoIter<DestinationSuite>> = Vec::new();

    if let Some(children) = list_children(dest, root_id).await {
        stack.push(children.into_iter());
    }

    while let Some(siblings) = stack.last_mut() {
        let Some(suite) = siblings.next() else {
            stack.pop();
            continue;
        };

        if !index.insert(suite.key(), suite.id) {
            debug!(
                suite_id = suite.id,
                name = %suite.name,
                "suite key already indexed, not descending"
            );
            continue;
        }
        debug!(
            suite_id = suite.id,
            name = %suite.name,
            kind = %suite.suite_kind,
            "indexed suite"
        );

        if let Some(children) = list_children(dest, suite.id).await {
            stack.push(children.into_iter());
        }
    }

    index
}

async fn list_children(
    dest: &dyn DestinationSystem,
    parent_id: u64,
) -> Option<Vec<DestinationSuite>> {
    match dest.list_child_suites(parent_id).await {
        Ok(children) => Some(children),
        Err(e) => {
            warn!(parent_id, error = %e, "could not list child suites, skipping subtree");
            None
        }
    }
}
