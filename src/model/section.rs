use serde::Deserialize;

/// A TestRail section. Each one becomes a static suite in Azure DevOps.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: u64,
    #[serde(default = "unnamed_section")]
    pub name: String,
    #[serde(default, rename = "parent_id")]
    pub parent_section_id: Option<u64>,
}

fn unnamed_section() -> String {
    "Unnamed Section".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_testrail_section() {
        let json = r#"{"id":10,"name":"Login","parent_id":null,"depth":0,"suite_id":2}"#;
        let section: Section = serde_json::from_str(json).unwrap();
        assert_eq!(section.id, 10);
        assert_eq!(section.name, "Login");
        assert_eq!(section.parent_section_id, None);
    }

    #[test]
    fn missing_name_defaults() {
        let section: Section = serde_json::from_str(r#"{"id":3,"parent_id":1}"#).unwrap();
        assert_eq!(section.name, "Unnamed Section");
        assert_eq!(section.parent_section_id, Some(1));
    }
}
