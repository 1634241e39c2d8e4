use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::http::{execute, HttpResponse};
use super::throttle::Throttle;
use super::SourceSystem;
use crate::config::TestRailConfig;
use crate::error::MigrationError;
use crate::model::case::Case;
use crate::model::section::Section;

pub struct TestRailClient {
    base_url: String,
    project_id: u64,
    suite_id: u64,
    auth_header: String,
    client: reqwest::Client,
    throttle: Arc<Throttle>,
}

impl TestRailClient {
    pub fn new(
        config: &TestRailConfig,
        client: reqwest::Client,
        throttle: Arc<Throttle>,
    ) -> Self {
        let creds = format!("{}:{}", config.user, config.api_key);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        let mut base_url = config.url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            project_id: config.project_id,
            suite_id: config.suite_id,
            auth_header: format!("Basic {encoded}"),
            client,
            throttle,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}index.php?/api/v2/{method}/{}&suite_id={}",
            self.base_url, self.project_id, self.suite_id
        )
    }

    async fn get(&self, method: &str) -> Result<HttpResponse, MigrationError> {
        let request = self
            .client
            .get(self.endpoint(method))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json");
        execute(&self.throttle, method, request).await
    }
}

#[async_trait]
impl SourceSystem for TestRailClient {
    fn name(&self) -> &str {
        "TestRail"
    }

    async fn fetch_sections(&self) -> Result<Vec<Section>, MigrationError> {
        let resp = self.get("get_sections").await?;
        decode_listing(&resp, "get_sections", "sections")
    }

    async fn fetch_cases(&self) -> Result<Vec<Case>, MigrationError> {
        let resp = self.get("get_cases").await?;
        decode_listing(&resp, "get_cases", "cases")
    }
}

/// Decode a TestRail listing: either a bare array or an object holding the
/// array under `field`. An `error` field wins over any data in the body.
pub fn decode_listing<T: DeserializeOwned>(
    resp: &HttpResponse,
    what: &str,
    field: &str,
) -> Result<Vec<T>, MigrationError> {
    let data: Value = match serde_json::from_str(&resp.body) {
        Ok(data) => data,
        Err(_) if !resp.is_success() => return Err(resp.clone().into_upstream_error(what)),
        Err(e) => {
            return Err(MigrationError::decode(
                what,
                format!("{e}; body: {}", resp.body),
            ))
        }
    };

    if let Some(error) = data.get("error").filter(|e| has_error(e)) {
        let body = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(MigrationError::Upstream {
            what: what.into(),
            status: resp.status,
            body,
        });
    }

    if !resp.is_success() {
        return Err(resp.clone().into_upstream_error(what));
    }

    let list = match data {
        Value::Array(_) => data,
        Value::Object(mut obj) => match obj.remove(field) {
            Some(list @ Value::Array(_)) => list,
            _ => {
                return Err(MigrationError::decode(
                    what,
                    format!("response has no `{field}` list"),
                ))
            }
        },
        other => {
            return Err(MigrationError::decode(
                what,
                format!("expected a list, got {other}"),
            ))
        }
    };

    serde_json::from_value(list).map_err(|e| MigrationError::decode(what, e))
}

fn has_error(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
