use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub testrail: TestRailConfig,
    pub azure_devops: AzureDevOpsConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Deserialize)]
pub struct TestRailConfig {
    pub url: String,
    pub user: String,
    pub api_key: String,
    pub project_id: u64,
    pub suite_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct AzureDevOpsConfig {
    pub organization: String,
    pub project: String,
    pub pat: String,
    pub plan_id: u64,
    /// Static suite that every migrated section is created under.
    pub root_suite_id: u64,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    pub journal: Option<PathBuf>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_delay_ms(),
            request_timeout_secs: default_timeout_secs(),
            journal: None,
        }
    }
}

impl MigrationConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.journal
            .clone()
            .unwrap_or_else(|| data_dir().join("migration-activity.jsonl"))
    }
}

fn default_api_version() -> String {
    "6.0".into()
}

fn default_base_url() -> String {
    "https://dev.azure.com".into()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".testrail-migrate")
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}
