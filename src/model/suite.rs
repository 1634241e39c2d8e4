use crate::util::normalize::normalize;

pub const STATIC_SUITE_KIND: &str = "StaticTestSuite";

/// A test suite in an Azure DevOps test plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSuite {
    pub id: u64,
    pub name: String,
    pub parent_id: u64,
    pub suite_kind: String,
}

/// Identity of a suite under its parent: names compare case- and
/// whitespace-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuiteIndexKey {
    pub normalized_name: String,
    pub parent_id: u64,
}

impl SuiteIndexKey {
    pub fn new(name: &str, parent_id: u64) -> Self {
        Self {
            normalized_name: normalize(name),
            parent_id,
        }
    }
}

impl DestinationSuite {
    pub fn key(&self) -> SuiteIndexKey {
        SuiteIndexKey::new(&self.name, self.parent_id)
    }
}
