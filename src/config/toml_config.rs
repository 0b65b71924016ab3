use crate::core::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_COMMERCE_BASE_URL: &str = "https://www.wixapis.com";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MAX_PAGES: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub commerce: CommerceConfig,
    pub filter: Option<FilterConfig>,
    pub sheets: SheetsConfig,
    pub highlight: Option<HighlightConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    pub api_key: String,
    pub site_id: String,
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub max_pages: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub plan_name_contains: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub worksheet_id: i64,
    pub credentials_path: String,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    pub expiring_within_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SyncError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left
    /// in place so validation can name them.
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn commerce_base_url(&self) -> &str {
        self.commerce
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_COMMERCE_BASE_URL)
    }

    pub fn sheets_base_url(&self) -> &str {
        self.sheets
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_SHEETS_BASE_URL)
    }

    pub fn page_size(&self) -> u32 {
        self.commerce.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn commerce_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.commerce
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn sheets_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.sheets.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn max_pages(&self) -> usize {
        self.commerce.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("commerce.api_key", &self.commerce.api_key)?;
        validation::validate_non_empty_string("commerce.site_id", &self.commerce.site_id)?;
        validation::validate_url("commerce.base_url", self.commerce_base_url())?;
        validation::validate_range("commerce.page_size", self.page_size(), 1, 100)?;
        validation::validate_range("commerce.max_pages", self.max_pages(), 1, 100_000)?;

        validation::validate_non_empty_string("sheets.spreadsheet_id", &self.sheets.spreadsheet_id)?;
        validation::validate_url("sheets.base_url", self.sheets_base_url())?;
        validation::validate_non_empty_string("sheets.credentials_path", &self.sheets.credentials_path)?;
        validation::validate_file_extension(
            "sheets.credentials_path",
            &self.sheets.credentials_path,
            &["json"],
        )?;
        validation::validate_file_exists("sheets.credentials_path", &self.sheets.credentials_path)?;

        if let Some(days) = self.expiring_within_days() {
            validation::validate_range("highlight.expiring_within_days", days, 0, 3650)?;
        }

        Ok(())
    }
}

impl ConfigProvider for SyncConfig {
    fn plan_name_filter(&self) -> Option<&str> {
        self.filter
            .as_ref()
            .and_then(|f| f.plan_name_contains.as_deref())
            .filter(|s| !s.is_empty())
    }

    fn expiring_within_days(&self) -> Option<i64> {
        self.highlight.as_ref().and_then(|h| h.expiring_within_days)
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
