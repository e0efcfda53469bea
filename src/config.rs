use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "employment-verifier.toml";
const RC_FILE_NAME: &str = ".employment-verifier-rc";
const ENV_PREFIX: &str = "EMPLOYMENT_VERIFIER";

/// Main configuration structure for the employment verifier
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerifierConfig {
    /// Collaborator service settings
    pub service: ServiceConfig,
    /// Last-upload cache settings
    pub cache: CacheConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL shared by every collaborator endpoint
    pub base_url: String,
    /// Per-request timeout; requests may wait indefinitely when unset
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Persist the last upload response and restore it on start
    pub enabled: bool,
    /// Location of the cached upload response
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_seconds: None,
                rate_limit: RateLimitConfig {
                    requests_per_second: 10,
                    burst_capacity: 20,
                },
            },
            cache: CacheConfig {
                enabled: true,
                path: PathBuf::from(".employment-verifier/last_certificate_response.json"),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl VerifierConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (employment-verifier.toml, .employment-verifier-rc)
    /// 3. Environment variables (prefixed with EMPLOYMENT_VERIFIER__)
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`VerifierConfig::load`], resolving config files under `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let defaults = Config::try_from(&VerifierConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if dir.join(CONFIG_FILE_NAME).exists() {
            builder = builder.add_source(File::from(dir.join(CONFIG_FILE_NAME)));
        }

        if dir.join(RC_FILE_NAME).exists() {
            builder = builder.add_source(
                File::from(dir.join(RC_FILE_NAME)).format(config::FileFormat::Toml),
            );
        }

        // Override with environment variables, e.g. EMPLOYMENT_VERIFIER__SERVICE__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<VerifierConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = VerifierConfig::load_env_file();
        VerifierConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static VerifierConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let loaded = VerifierConfig::load_from_dir(dir.path()).unwrap();

        assert_eq!(loaded.service.rate_limit, VerifierConfig::default().service.rate_limit);
        assert!(loaded.cache.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[service]\nbase_url = \"http://verifier.internal:9000\"\nrequest_timeout_seconds = 15\n\n[cache]\nenabled = false\n",
        )
        .unwrap();

        let loaded = VerifierConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(loaded.service.base_url, "http://verifier.internal:9000");
        assert_eq!(loaded.service.request_timeout_seconds, Some(15));
        assert!(!loaded.cache.enabled);
        assert_eq!(loaded.observability.log_level, "info");
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        let mut original = VerifierConfig::default();
        original.observability.json_logs = true;
        original.service.rate_limit.burst_capacity = 3;

        original.save_to_file(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        let loaded = VerifierConfig::load_from_dir(dir.path()).unwrap();

        assert!(loaded.observability.json_logs);
        assert_eq!(loaded.service.rate_limit.burst_capacity, 3);
    }
}
