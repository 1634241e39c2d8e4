pub mod azure_devops;
pub mod http;
pub mod testrail;
pub mod throttle;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::MigrationError;
use crate::model::case::Case;
use crate::model::section::Section;
use crate::model::suite::DestinationSuite;
use crate::model::work_item::{CreatedWorkItem, PatchOperation};

/// Read side of the migration.
#[async_trait]
pub trait SourceSystem: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_sections(&self) -> Result<Vec<Section>, MigrationError>;
    async fn fetch_cases(&self) -> Result<Vec<Case>, MigrationError>;
}

/// Write side of the migration: a test plan with a suite tree.
#[async_trait]
pub trait DestinationSystem: Send + Sync {
    fn name(&self) -> &str;
    /// Direct children of `parent_id` only.
    async fn list_child_suites(
        &self,
        parent_id: u64,
    ) -> Result<Vec<DestinationSuite>, MigrationError>;
    async fn create_suite(
        &self,
        name: &str,
        parent_id: u64,
    ) -> Result<DestinationSuite, MigrationError>;
    async fn create_work_item(
        &self,
        fields: &[PatchOperation],
    ) -> Result<CreatedWorkItem, MigrationError>;
    async fn add_case_to_suite(
        &self,
        suite_id: u64,
        work_item_id: u64,
    ) -> Result<(), MigrationError>;
    /// Browser link for a work item, used in log output.
    fn work_item_url(&self, _work_item_id: u64) -> Option<String> {
        None
    }
}


pub fn create_providers(
    config: &AppConfig,
) -> anyhow::Result<(testrail::TestRailClient, azure_devops::AzureDevOpsClient)> {
    let client = reqwest::Client::builder()
        .timeout(config.migration.request_timeout())
        .build()?;
    let throttle = Arc::new(throttle::Throttle::new(config.migration.request_delay()));
    tracing::info!(
        delay_ms = throttle.delay().as_millis() as u64,
        timeout_secs = config.migration.request_timeout_secs,
        "request pacing"
    );

    let source = testrail::TestRailClient::new(&config.testrail, client.clone(), throttle.clone());
    let destination =
        azure_devops::AzureDevOpsClient::new(&config.azure_devops, client, throttle);
    Ok((source, destination))
}
