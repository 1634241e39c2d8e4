use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of the migration activity journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEvent {
    pub timestamp: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_item_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JournalEvent {
    pub fn new(event: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event: event.to_string(),
            section: None,
            suite_id: None,
            case_id: None,
            title: None,
            work_item_id: None,
            message: None,
        }
    }

    pub fn section(mut self, name: &str) -> Self {
        self.section = Some(name.into());
        self
    }

    pub fn suite(mut self, suite_id: u64) -> Self {
        self.suite_id = Some(suite_id);
        self
    }

    pub fn case(mut self, case_id: u64, title: &str) -> Self {
        self.case_id = Some(case_id);
        self.title = Some(title.into());
        self
    }

    pub fn work_item(mut self, work_item_id: u64) -> Self {
        self.work_item_id = Some(work_item_id);
        self
    }

    pub fn message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Append-only JSONL record of what a run did. A disabled journal drops
/// everything.
pub struct Journal {
    path: Option<PathBuf>,
}

impl Journal {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Write failures are logged and otherwise ignored.
    pub fn record(&self, event: JournalEvent) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_event(path, &event) {
            tracing::warn!(path = %path.display(), error = %e, "could not write journal entry");
        }
    }
}

pub fn append_event(path: &Path, event: &JournalEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let line = serde_json::to_string(event)?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
pub fn read_events(path: &Path, limit: Option<usize>) -> Vec<JournalEvent> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut events: Vec<JournalEvent> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    if let Some(limit) = limit {
        let len = events.len();
        if len > limit {
            events = events.split_off(len - limit);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.jsonl");
        let journal = Journal::new(path.clone());

        journal.record(JournalEvent::new("suite_created").section("Login").suite(5));
        journal.record(JournalEvent::new("case_created").case(1, "Valid login").work_item(77));

        let events = read_events(&path, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "suite_created");
        assert_eq!(events[0].suite_id, Some(5));
        assert_eq!(events[1].title.as_deref(), Some("Valid login"));
        assert_eq!(events[1].work_item_id, Some(77));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let line = serde_json::to_string(&JournalEvent::new("run_started")).unwrap();
        assert!(!line.contains("case_id"));
        assert!(!line.contains("message"));
    }

    #[test]
    fn read_events_skips_malformed_lines_and_applies_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        append_event(&path, &JournalEvent::new("a")).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();
        append_event(&path, &JournalEvent::new("b")).unwrap();
        append_event(&path, &JournalEvent::new("c")).unwrap();

        let events: Vec<String> = read_events(&path, Some(2))
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(events, ["b", "c"]);
    }

    #[test]
    fn disabled_journal_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        Journal::disabled().record(JournalEvent::new("case_failed"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_events(&dir.path().join("none.jsonl"), None).is_empty());
    }
}
