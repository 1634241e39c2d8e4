use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::MigrationError;
use crate::model::case::Case;
use crate::model::section::Section;
use crate::providers::SourceSystem;

/// Everything read from TestRail for one run.
#[derive(Debug, Default)]
pub struct SourceData {
    pub sections: Vec<Section>,
    pub cases_by_section: HashMap<u64, Vec<Case>>,
}

impl SourceData {
    pub fn cases_for(&self, section_id: u64) -> &[Case] {
        self.cases_by_section
            .get(&section_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn case_count(&self) -> usize {
        self.cases_by_section.values().map(Vec::len).sum()
    }
}

pub async fn load(source: &dyn SourceSystem) -> Result<SourceData, MigrationError> {
    info!(source = source.name(), "fetching sections");
    let sections = source.fetch_sections().await?;
    info!(count = sections.len(), "found sections");

    info!(source = source.name(), "fetching test cases");
    let cases = source.fetch_cases().await?;
    info!(count = cases.len(), "found test cases");

    let data = SourceData {
        sections,
        cases_by_section: group_by_section(cases),
    };

    let orphaned: usize = data
        .cases_by_section
        .iter()
        .filter(|(id, _)| !data.sections.iter().any(|s| s.id == **id))
        .map(|(_, cases)| cases.len())
        .sum();
    if orphaned > 0 {
        warn!(count = orphaned, "test cases reference sections that were not listed");
    }

    Ok(data)
}

/// Group cases by owning section, keeping listing order within each group.
/// Cases without a section are dropped.
pub fn group_by_section(cases: Vec<Case>) -> HashMap<u64, Vec<Case>> {
    let mut grouped: HashMap<u64, Vec<Case>> = HashMap::new();
    for case in cases {
        match case.section_id {
            Some(section_id) => grouped.entry(section_id).or_default().push(case),
            None => warn!(
                case_id = case.id,
                title = %case.title,
                "test case has no section, dropping"
            ),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tests::{make_case, make_section, MockSource};

    #[test]
    fn groups_in_listing_order() {
        let grouped = group_by_section(vec![
            make_case(1, Some(10), "a"),
            make_case(2, Some(20), "b"),
            make_case(3, Some(10), "c"),
        ]);
        let ids: Vec<u64> = grouped[&10].iter().map(|c| c.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(grouped[&20].len(), 1);
    }

    #[test]
    fn drops_cases_without_section() {
        let grouped = group_by_section(vec![make_case(1, None, "a"), make_case(2, Some(10), "b")]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.values().map(Vec::len).sum::<usize>(), 1);
    }

    #[tokio::test]
    async fn load_groups_fetched_cases() {
        let source = MockSource::new(
            vec![make_section(10, "Login"), make_section(20, "Cart")],
            vec![make_case(1, Some(10), "a"), make_case(2, Some(10), "b")],
        );
        let data = load(&source).await.unwrap();
        assert_eq!(data.sections.len(), 2);
        assert_eq!(data.cases_for(10).len(), 2);
        assert!(data.cases_for(20).is_empty());
        assert_eq!(data.case_count(), 2);
    }

    #[tokio::test]
    async fn load_propagates_fetch_errors() {
        let source = MockSource::new(vec![make_section(10, "Login")], vec![]).with_case_failure();
        let err = load(&source).await.unwrap_err();
        assert!(matches!(err, MigrationError::Upstream { .. }));
    }
}
