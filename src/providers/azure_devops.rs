use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;

use super::http::execute;
use super::throttle::Throttle;
use super::DestinationSystem;
use crate::config::AzureDevOpsConfig;
use crate::error::MigrationError;
use crate::model::suite::{DestinationSuite, STATIC_SUITE_KIND};
use crate::model::work_item::{CreatedWorkItem, PatchOperation, TEST_CASE_TYPE};

pub struct AzureDevOpsClient {
    project_url: String,
    plan_id: u64,
    api_version: String,
    auth_header: String,
    client: reqwest::Client,
    throttle: Arc<Throttle>,
}

impl AzureDevOpsClient {
    pub fn new(
        config: &AzureDevOpsConfig,
        client: reqwest::Client,
        throttle: Arc<Throttle>,
    ) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{}", config.pat));
        Self {
            project_url: format!(
                "{}/{}/{}",
                config.base_url.trim_end_matches('/'),
                config.organization,
                config.project
            ),
            plan_id: config.plan_id,
            api_version: config.api_version.clone(),
            auth_header: format!("Basic {encoded}"),
            client,
            throttle,
        }
    }

    fn child_suites_url(&self, parent_id: u64) -> String {
        format!(
            "{}/_apis/test/plans/{}/suites/{parent_id}/suites?api-version={}",
            self.project_url, self.plan_id, self.api_version
        )
    }

    fn work_item_create_url(&self) -> String {
        format!(
            "{}/_apis/wit/workitems/${}?api-version={}",
            self.project_url,
            urlencoding::encode(TEST_CASE_TYPE),
            self.api_version
        )
    }

    fn suite_test_case_url(&self, suite_id: u64, work_item_id: u64) -> String {
        format!(
            "{}/_apis/test/plans/{}/suites/{suite_id}/testcases/{work_item_id}?api-version={}",
            self.project_url, self.plan_id, self.api_version
        )
    }
}

#[derive(Deserialize)]
struct SuiteList {
    #[serde(default)]
    value: Vec<RawSuite>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuite {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
    name: String,
    parent: Option<ParentRef>,
    suite_type: Option<String>,
}

#[derive(Deserialize)]
struct ParentRef {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
}

#[derive(Deserialize)]
struct CreatedSuite {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
}

#[derive(Deserialize)]
struct WorkItemResponse {
    id: u64,
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
}

/// Suite ids come back as numbers from some API versions and as numeric
/// strings from others.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl RawSuite {
    fn into_suite(self, requested_parent: u64) -> DestinationSuite {
        DestinationSuite {
            id: self.id,
            name: self.name,
            parent_id: self.parent.map(|p| p.id).unwrap_or(requested_parent),
            suite_kind: self.suite_type.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl DestinationSystem for AzureDevOpsClient {
    fn name(&self) -> &str {
        "Azure DevOps"
    }

    async fn list_child_suites(
        &self,
        parent_id: u64,
    ) -> Result<Vec<DestinationSuite>, MigrationError> {
        let what = format!("child suites of {parent_id}");
        let request = self
            .client
            .get(self.child_suites_url(parent_id))
            .header("Authorization", &self.auth_header);
        let resp = execute(&self.throttle, &what, request).await?;
        if !resp.is_success() {
            return Err(resp.into_upstream_error(&what));
        }

        let list: SuiteList = resp.json(&what)?;
        Ok(list
            .value
            .into_iter()
            .map(|s| s.into_suite(parent_id))
            .collect())
    }

    async fn create_suite(
        &self,
        name: &str,
        parent_id: u64,
    ) -> Result<DestinationSuite, MigrationError> {
        let what = format!("suite {name:?}");
        let body = serde_json::json!({ "name": name, "suiteType": STATIC_SUITE_KIND });
        let request = self
            .client
            .post(self.child_suites_url(parent_id))
            .header("Authorization", &self.auth_header)
            .json(&body);
        let resp = execute(&self.throttle, &what, request).await?;
        if !resp.is_success() {
            return Err(MigrationError::Creation {
                what,
                reason: format!("status {}: {}", resp.status, resp.body),
            });
        }

        let created: CreatedSuite = resp.json(&what).map_err(|e| MigrationError::Creation {
            what: what.clone(),
            reason: e.to_string(),
        })?;
        Ok(DestinationSuite {
            id: created.id,
            name: name.to_string(),
            parent_id,
            suite_kind: STATIC_SUITE_KIND.into(),
        })
    }

    async fn create_work_item(
        &self,
        fields: &[PatchOperation],
    ) -> Result<CreatedWorkItem, MigrationError> {
        let what = "test case work item";
        let body = serde_json::to_string(fields).map_err(|e| MigrationError::Creation {
            what: what.into(),
            reason: e.to_string(),
        })?;
        let request = self
            .client
            .post(self.work_item_create_url())
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json-patch+json")
            .body(body);
        let resp = execute(&self.throttle, what, request).await?;
        if !resp.is_success() {
            return Err(MigrationError::Creation {
                what: what.into(),
                reason: format!("status {}: {}", resp.status, resp.body),
            });
        }

        let item: WorkItemResponse = resp.json(what)?;
        let work_item_type = item
            .fields
            .get("System.WorkItemType")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(CreatedWorkItem {
            id: item.id,
            work_item_type,
        })
    }

    async fn add_case_to_suite(
        &self,
        suite_id: u64,
        work_item_id: u64,
    ) -> Result<(), MigrationError> {
        let what = format!("link {work_item_id} to suite {suite_id}");
        let request = self
            .client
            .post(self.suite_test_case_url(suite_id, work_item_id))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json");
        let resp = execute(&self.throttle, &what, request)
            .await
            .map_err(|e| MigrationError::Link {
                work_item_id,
                suite_id,
                reason: e.to_string(),
            })?;
        if !resp.is_success() {
            return Err(MigrationError::Link {
                work_item_id,
                suite_id,
                reason: format!("status {}: {}", resp.status, resp.body),
            });
        }
        Ok(())
    }

    fn work_item_url(&self, work_item_id: u64) -> Option<String> {
        Some(format!("{}/_workitems/edit/{work_item_id}", self.project_url))
    }
}
