use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub deadlines: DeadlineConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the task store. Defaults to the XDG data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_seed_url")]
    pub url: String,
    #[serde(default = "default_seed_limit")]
    pub limit: usize,
    #[serde(default = "default_seed_timeout")]
    pub timeout_secs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            enabled: true,
            url: default_seed_url(),
            limit: default_seed_limit(),
            timeout_secs: default_seed_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineConfig {
    /// How often the TUI re-checks deadlines
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// A deadline closer than this counts as "due soon"
    #[serde(default = "default_soon_minutes")]
    pub soon_minutes: i64,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        DeadlineConfig {
            check_interval_secs: default_check_interval(),
            soon_minutes: default_soon_minutes(),
        }
    }
}

/// Desktop notification permission, mirroring the platform's tri-state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    Denied,
    #[default]
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_popup_timeout")]
    pub popup_timeout_ms: u64,
    #[serde(default)]
    pub notifications: NotificationPermission,
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Capture the mouse for click and drag-to-reorder
    #[serde(default = "default_true")]
    pub mouse: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            popup_timeout_ms: default_popup_timeout(),
            notifications: NotificationPermission::Default,
            show_key_hints: true,
            mouse: true,
            colors: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_seed_url() -> String {
    "https://jsonplaceholder.typicode.com/todos".to_string()
}

fn default_seed_limit() -> usize {
    12
}

fn default_seed_timeout() -> u64 {
    10
}

fn default_check_interval() -> u64 {
    30
}

fn default_soon_minutes() -> i64 {
    60
}

fn default_popup_timeout() -> u64 {
    3000
}
