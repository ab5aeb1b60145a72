use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the delivery console
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConsoleConfig {
    /// Portal backend API settings
    pub api: ApiConfig,
    /// Shippit integration settings
    pub shippit: ShippitConfig,
    /// Notice display settings
    pub notices: NoticeConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend root, e.g. http://localhost:3000/api
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_ms: u64,
    /// Sustained request rate
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
    /// Geocoding cache entry lifetime
    pub cache_ttl_seconds: u64,
    /// Geocoding cache size
    pub cache_capacity: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_ms: 15_000,
            requests_per_second: 5,
            burst_capacity: 10,
            cache_ttl_seconds: 300,
            cache_capacity: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShippitConfig {
    /// Public tracking page; the tracking id is appended
    pub tracking_url_base: String,
}

impl Default for ShippitConfig {
    fn default() -> Self {
        Self {
            tracking_url_base: "https://app.staging.shippit.com/tracking/".to_string(),
        }
    }
}

impl ShippitConfig {
    pub fn tracking_url(&self, tracking_id: &str) -> String {
        format!("{}{}", self.tracking_url_base, tracking_id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NoticeConfig {
    /// Auto-clear timeout on the delivery details workflow
    pub delivery_timeout_ms: u64,
    /// Auto-clear timeout on the route planner
    pub route_planner_timeout_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: 6000,
            route_planner_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl DeliveryConsoleConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (delivery-console.toml, .delivery-console-rc)
    /// 3. Environment variables (prefixed with DELIVERY_CONSOLE_, nested keys joined by `__`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`Self::load`] with config files looked up under `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_file = dir.join("delivery-console.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file));
        }

        let rc_file = dir.join(".delivery-console-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("DELIVERY_CONSOLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let delivery_config: DeliveryConsoleConfig = config.try_deserialize()?;
        Ok(delivery_config)
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
static CONFIG: std::sync::LazyLock<Result<DeliveryConsoleConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = DeliveryConsoleConfig::load_env_file();
        DeliveryConsoleConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DeliveryConsoleConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
