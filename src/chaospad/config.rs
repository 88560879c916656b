use crate::endpoints::DEFAULT_API_BASE;
use crate::error::{ChaospadError, Result};
use crate::panel::PanelSettings;
use crate::state::{Pagination, Sort, DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

pub const ENV_CONFIG_DIR: &str = "CHAOSPAD_CONFIG_DIR";
pub const ENV_SERVER_URL: &str = "CHAOSPAD_URL";
pub const ENV_ACCESS_TOKEN: &str = "CHAOSPAD_ACCESS_TOKEN";
pub const ENV_API_KEY: &str = "CHAOSPAD_API_KEY";

/// Keys accepted by [`PanelConfig::get`] and [`PanelConfig::set`].
pub const KEYS: [&str; 7] = [
    "server-url",
    "api-base",
    "access-token",
    "api-key",
    "rows-per-page",
    "sort-by",
    "descending",
];

/// Configuration for the pads client, stored in `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelConfig {
    /// Origin of the dashboard serving the pads API
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Path prefix of the extension API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default = "default_descending")]
    pub descending: bool,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_rows_per_page() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_sort_by() -> String {
    DEFAULT_SORT_FIELD.to_string()
}

fn default_descending() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_base: default_api_base(),
            access_token: None,
            api_key: None,
            rows_per_page: default_rows_per_page(),
            sort_by: default_sort_by(),
            descending: default_descending(),
        }
    }
}

/// Platform config directory, unless `CHAOSPAD_CONFIG_DIR` points elsewhere.
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "chaospad", "chaospad")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ChaospadError::Config("Could not determine config dir".to_string()))
}

impl PanelConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Apply `CHAOSPAD_URL`, `CHAOSPAD_ACCESS_TOKEN` and `CHAOSPAD_API_KEY`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_SERVER_URL).filter(|v| !v.is_empty()) {
            self.server_url = url;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            self.access_token = Some(token);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "server-url" => Some(self.server_url.clone()),
            "api-base" => Some(self.api_base.clone()),
            "access-token" => Some(self.access_token.clone().unwrap_or_default()),
            "api-key" => Some(self.api_key.clone().unwrap_or_default()),
            "rows-per-page" => Some(self.rows_per_page.to_string()),
            "sort-by" => Some(self.sort_by.clone()),
            "descending" => Some(self.descending.to_string()),
            _ => None,
        }
    }

    /// Set a value by key. An empty value clears the optional credentials.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server-url" => {
                url::Url::parse(value)?;
                self.server_url = value.to_string();
            }
            "api-base" => self.api_base = normalize_api_base(value),
            "access-token" => self.access_token = non_empty(value),
            "api-key" => self.api_key = non_empty(value),
            "rows-per-page" => {
                self.rows_per_page = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid(key, value))?;
            }
            "sort-by" => self.sort_by = value.to_string(),
            "descending" => {
                self.descending = value.parse().map_err(|_| invalid(key, value))?;
            }
            other => {
                return Err(ChaospadError::Config(format!(
                    "Unknown config key: {other}"
                )))
            }
        }
        Ok(())
    }

    pub fn panel_settings(&self) -> PanelSettings {
        PanelSettings {
            api_base: self.api_base.clone(),
            pagination: Pagination {
                sort: Sort {
                    field: self.sort_by.clone(),
                    descending: self.descending,
                },
                page: 1,
                page_size: self.rows_per_page.max(1),
                total_count: self.rows_per_page.max(1),
            },
            search: String::new(),
        }
    }
}

fn normalize_api_base(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn invalid(key: &str, value: &str) -> ChaospadError {
    ChaospadError::Config(format!("Invalid value for {key}: {value}"))
}
