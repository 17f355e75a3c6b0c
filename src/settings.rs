use crate::cache::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a color assignment treats a selected group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColorPolicy {
    /// Tag only the selected node itself.
    TagGroup,
    /// Tag the selected node and every leaf beneath it.
    Descendants,
}

impl Default for GroupColorPolicy {
    fn default() -> Self {
        GroupColorPolicy::TagGroup
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the panel initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Number of attempts made for one layer metadata query.
    #[serde(default = "default_query_attempts")]
    pub query_attempts: u32,
    /// Delay between failed query attempts in milliseconds.
    #[serde(default = "default_query_backoff_ms")]
    pub query_backoff_ms: u64,
    /// Host history label for visibility toggles.
    #[serde(default = "default_toggle_command_name")]
    pub toggle_command_name: String,
    /// Host history label for color assignment.
    #[serde(default = "default_assign_command_name")]
    pub assign_command_name: String,
    #[serde(default)]
    pub group_color_policy: GroupColorPolicy,
}

fn default_query_attempts() -> u32 {
    3
}

fn default_query_backoff_ms() -> u64 {
    100
}

fn default_toggle_command_name() -> String {
    "Toggle layer visibility".into()
}

fn default_assign_command_name() -> String {
    "Set layer color".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            query_attempts: default_query_attempts(),
            query_backoff_ms: default_query_backoff_ms(),
            toggle_command_name: default_toggle_command_name(),
            assign_command_name: default_assign_command_name(),
            group_color_policy: GroupColorPolicy::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.query_attempts == 0 {
            tracing::warn!("query_attempts of 0 is invalid; using a single attempt");
        }
        RetryPolicy {
            attempts: self.query_attempts.max(1),
            backoff: Duration::from_millis(self.query_backoff_ms),
        }
    }
}
