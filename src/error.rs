use thiserror::Error;

/// Failures raised while talking to either side of the migration.
///
/// Only `Decode`, `Upstream` and `Transport` coming out of the initial
/// TestRail fetch abort a run; everything else is local to one suite or case.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("could not decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("{what} failed with status {status}: {body}")]
    Upstream {
        what: String,
        status: u16,
        body: String,
    },

    #[error("request for {what} could not be completed: {reason}")]
    Transport { what: String, reason: String },

    #[error("creating {what} was rejected: {reason}")]
    Creation { what: String, reason: String },

    #[error("work item {work_item_id} was not added to suite {suite_id}: {reason}")]
    Link {
        work_item_id: u64,
        suite_id: u64,
        reason: String,
    },

    #[error("created work item {work_item_id} is a {actual:?}, expected {expected:?}")]
    TypeMismatch {
        work_item_id: u64,
        expected: String,
        actual: String,
    },
}

impl MigrationError {
    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn transport(what: impl Into<String>, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "timed out".to_string()
        } else {
            err.to_string()
        };
        Self::Transport {
            what: what.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status_and_body() {
        let err = MigrationError::Upstream {
            what: "get_sections".into(),
            status: 401,
            body: "Authentication failed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Authentication failed"));
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let err = MigrationError::TypeMismatch {
            work_item_id: 7,
            expected: "Test Case".into(),
            actual: "Bug".into(),
        };
        assert_eq!(
            err.to_string(),
            "created work item 7 is a \"Bug\", expected \"Test Case\""
        );
    }
}
