use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the whois API key.
pub const API_KEY_ENV: &str = "WHOIS_API_KEY";

const DEFAULT_API_URL: &str = "https://api.whoapi.com/";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: String,
    pub request_timeout_seconds: u64,
    pub cache_dir: PathBuf,
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub request_timeout_seconds: u64,
    pub cache_dir: String,
    pub cache_ttl_seconds: u64,
}

impl Config {
    /// Build the configuration from defaults and `WHOIS_*` environment overrides.
    ///
    /// Only the binary entry point calls this; library code takes a `Config`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut settings = config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("request_timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("cache_dir", Self::default_cache_dir().to_string_lossy().into_owned())?
            .set_default("cache_ttl_seconds", DEFAULT_CACHE_TTL_SECONDS)?;

        settings = Self::apply_env_overrides(settings)?;

        let config_data: ConfigData = settings.build()?.try_deserialize()?;

        Ok(Config {
            // A blank key is as good as none
            api_key: config_data.api_key.filter(|key| !key.trim().is_empty()),
            api_url: config_data.api_url,
            request_timeout_seconds: config_data.request_timeout_seconds,
            cache_dir: PathBuf::from(config_data.cache_dir),
            cache_ttl_seconds: config_data.cache_ttl_seconds,
        })
    }

    /// Per-user cache directory, or a local one when the platform has none.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("whois-check"))
            .unwrap_or_else(|| PathBuf::from(".whois-cache"))
    }

    fn apply_env_overrides(mut settings: config::ConfigBuilder<config::builder::DefaultState>) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let env_mappings = [
            (API_KEY_ENV, "api_key"),
            ("WHOIS_API_URL", "api_url"),
            ("WHOIS_TIMEOUT_SECONDS", "request_timeout_seconds"),
            ("WHOIS_TIMEOUT", "request_timeout_seconds"),
            ("WHOIS_CACHE_DIR", "cache_dir"),
            ("WHOIS_CACHE_TTL_SECONDS", "cache_ttl_seconds"),
            ("WHOIS_CACHE_TTL", "cache_ttl_seconds"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            cache_dir: Self::default_cache_dir(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}
