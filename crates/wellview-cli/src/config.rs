use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wellview_core::{MAX_REPORT_LIMIT, TimeRange};
use wellview_egress::HttpClientConfig;
use wellview_egress::backend::DEFAULT_USER_ID_HEADER;
use wellview_observability::LoggingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Mood range shown when none is given on the command line
    #[serde(default)]
    pub default_range: TimeRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,

    #[serde(default = "default_report_limit")]
    pub report_limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id_header: default_user_id_header(),
            report_limit: default_report_limit(),
            session_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("WELLVIEW_BASE_URL") {
            self.backend.base_url = val;
        }

        if let Ok(val) = std::env::var("WELLVIEW_SESSION_TOKEN") {
            self.backend.session_token = Some(val);
        }

        if let Ok(val) = std::env::var("WELLVIEW_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("WELLVIEW_LOG_FORMAT") {
            match val.parse() {
                Ok(format) => self.logging.format = format,
                Err(e) => eprintln!("Warning: Invalid WELLVIEW_LOG_FORMAT: {}", e),
            }
        }

        if let Ok(val) = std::env::var("WELLVIEW_DEFAULT_RANGE") {
            match val.parse() {
                Ok(range) => self.default_range = range,
                Err(e) => eprintln!("Warning: Invalid WELLVIEW_DEFAULT_RANGE: {}", e),
            }
        }

        if let Ok(val) = std::env::var("WELLVIEW_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.http.timeout_secs = Some(secs),
                Err(_) => eprintln!("Warning: Invalid WELLVIEW_TIMEOUT_SECS '{}', ignoring", val),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            bail!("backend.base_url must not be empty");
        }
        if self.backend.report_limit == 0 || self.backend.report_limit > MAX_REPORT_LIMIT {
            bail!(
                "backend.report_limit must be between 1 and {}, got {}",
                MAX_REPORT_LIMIT,
                self.backend.report_limit
            );
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_id_header() -> String {
    DEFAULT_USER_ID_HEADER.to_string()
}

fn default_report_limit() -> usize {
    MAX_REPORT_LIMIT
}
