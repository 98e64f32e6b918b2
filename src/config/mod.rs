//! Configuration module for the mockup service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::{FilterPolicy, PipelineError, TaskPolling};
use crate::providers::DEFAULT_MIN_INTERVAL;

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub printful: PrintfulSettings,
    pub storage: StorageSettings,
    pub mockups: MockupSettings,
    pub debug: DebugSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Printful API access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrintfulSettings {
    pub api_key: String,
    pub base_url: String,
    /// Minimum gap between upstream calls
    pub rate_limit_ms: u64,
    pub request_timeout_secs: u64,
}

/// S3 bucket for re-hosted mockups
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    pub download_timeout_secs: u64,
}

/// Mockup generation and filtering defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockupSettings {
    pub task_timeout_secs: u64,
    pub task_poll_interval_secs: u64,
    pub include_product_wide_list: bool,
    pub ignore_color: bool,
}

/// Verbose logging switches
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Debug-level logs and error traces in responses
    pub enabled: bool,
    /// Trace-level logs with full upstream payloads
    pub overkill: bool,
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Plain service variables (PRINTFUL_API_KEY, PUBLIC_IMAGE_BUCKET,
    ///    AWS_REGION, DEBUG_ON, DEBUG_OVERKILL)
    /// 2. Environment variables (prefixed with MOCKUP__)
    /// 3. config/local.toml (gitignored)
    /// 4. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (MOCKUP__PRINTFUL__API_KEY, etc.)
            .add_source(
                Environment::with_prefix("MOCKUP")
                    .separator("__")
                    .try_parsing(true)
            )
            .set_override_option("printful.api_key", env_value("PRINTFUL_API_KEY"))?
            .set_override_option("storage.bucket", env_value("PUBLIC_IMAGE_BUCKET"))?
            .set_override_option("storage.region", env_value("AWS_REGION"))?
            .set_override_option("debug.enabled", env_value("DEBUG_ON"))?
            .set_override_option("debug.overkill", env_value("DEBUG_OVERKILL"))?;

        builder.build()?.try_deserialize()
    }

    /// Fail fast on settings the service cannot run without
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.printful.api_key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "PRINTFUL_API_KEY environment variable is required".to_string(),
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "PUBLIC_IMAGE_BUCKET environment variable is required".to_string(),
            ));
        }

        let base_url = url::Url::parse(&self.printful.base_url).map_err(|e| {
            PipelineError::Configuration(format!("Invalid Printful base URL {:?}: {}", self.printful.base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(PipelineError::Configuration(format!(
                "Printful base URL must be http(s), got {}",
                base_url.scheme()
            )));
        }

        Ok(())
    }

    /// Default log filter when RUST_LOG is not set
    pub fn log_filter(&self) -> String {
        let level = if self.debug.overkill {
            "trace"
        } else if self.debug.enabled {
            "debug"
        } else {
            "info"
        };
        format!("info,mockup_resolver={}", level)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl ServerSettings {
    /// Worker count, two per CPU unless configured
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| num_cpus::get() * 2)
    }
}

impl MockupSettings {
    pub fn polling(&self) -> TaskPolling {
        TaskPolling {
            timeout: Duration::from_secs(self.task_timeout_secs),
            interval: Duration::from_secs(self.task_poll_interval_secs),
        }
    }

    pub fn policy(&self) -> FilterPolicy {
        FilterPolicy {
            include_product_wide_list: self.include_product_wide_list,
            ignore_color: self.ignore_color,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

impl Default for PrintfulSettings {
    fn default() -> Self {
        PrintfulSettings {
            api_key: String::new(),
            base_url: "https://api.printful.com".to_string(),
            rate_limit_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            download_timeout_secs: 60,
        }
    }
}

impl Default for MockupSettings {
    fn default() -> Self {
        MockupSettings {
            task_timeout_secs: 120,
            task_poll_interval_secs: 5,
            include_product_wide_list: false,
            ignore_color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        let mut settings = Settings::default();
        settings.printful.api_key = "token".to_string();
        settings.storage.bucket = "mockups".to_string();
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.printful.rate_limit_ms, 3000);
        assert_eq!(settings.printful.request_timeout_secs, 30);
        assert_eq!(settings.storage.region, "us-east-1");
        assert_eq!(settings.mockups.polling().timeout, Duration::from_secs(120));
        assert_eq!(settings.mockups.polling().interval, Duration::from_secs(5));
        assert_eq!(settings.mockups.policy(), FilterPolicy::default());
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut missing_key = valid();
        missing_key.printful.api_key = String::new();
        assert!(matches!(missing_key.validate(), Err(PipelineError::Configuration(m)) if m.contains("PRINTFUL_API_KEY")));

        let mut missing_bucket = valid();
        missing_bucket.storage.bucket = " ".to_string();
        assert!(matches!(missing_bucket.validate(), Err(PipelineError::Configuration(m)) if m.contains("PUBLIC_IMAGE_BUCKET")));

        let mut bad_url = valid();
        bad_url.printful.base_url = "not a url".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_scheme = valid();
        bad_scheme.printful.base_url = "ftp://api.printful.com".to_string();
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_log_filter_follows_debug_flags() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_filter(), "info,mockup_resolver=info");
        settings.debug.enabled = true;
        assert_eq!(settings.log_filter(), "info,mockup_resolver=debug");
        settings.debug.overkill = true;
        assert_eq!(settings.log_filter(), "info,mockup_resolver=trace");
    }

    #[test]
    fn test_worker_count() {
        let server = ServerSettings { workers: Some(3), ..ServerSettings::default() };
        assert_eq!(server.worker_count(), 3);
        assert!(ServerSettings::default().worker_count() >= 2);
    }
}
