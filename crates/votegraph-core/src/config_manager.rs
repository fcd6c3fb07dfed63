use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for VoteGraph.
///
/// Detection thresholds are fixed constants in the scorer and are not part
/// of this file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoteGraphConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// How results are rendered by the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "table", "json", "pretty"
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Only show the N highest-scoring report rows
    #[serde(default)]
    pub top: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            top: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_output_format() -> String {
    "table".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn plain_level(value: &str) -> Option<String> {
    let level = value.trim().to_lowercase();
    LOG_LEVELS.contains(&level.as_str()).then_some(level)
}

/// Configuration manager with layered defaults
pub struct ConfigManager {
    config: VoteGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.votegraph.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load an explicit config file, still honouring env overrides.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::load_dotenv();

        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: VoteGraphConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Loaded configuration from {}", path.display()),
            None => debug!("No config file found, using defaults"),
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".votegraph.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .votegraph.env: {}", e);
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.votegraph.toml (current directory)
    /// 2. ~/.votegraph/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(VoteGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".votegraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".votegraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((VoteGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<VoteGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: VoteGraphConfig) -> VoteGraphConfig {
        if let Ok(level) = std::env::var("VOTEGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            // Targets, `off` and directive lists stay with EnvFilter.
            if let Some(level) = plain_level(&filter) {
                config.logging.level = level;
            }
        }
        if let Ok(format) = std::env::var("VOTEGRAPH_LOG_FORMAT") {
            config.logging.format = format;
        }
        if let Ok(format) = std::env::var("VOTEGRAPH_OUTPUT_FORMAT") {
            config.output.format = format;
        }
        if let Ok(top) = std::env::var("VOTEGRAPH_TOP") {
            if let Ok(n) = top.parse() {
                config.output.top = Some(n);
            }
        }

        config
    }

    fn validate_config(config: &VoteGraphConfig) -> Result<(), ConfigError> {
        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be one of: {}",
                level,
                LOG_LEVELS.join(", ")
            )));
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        match config.output.format.as_str() {
            "table" | "json" | "pretty" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid output format: {}. Must be one of: table, json, pretty",
                    other
                )))
            }
        }

        if config.output.top == Some(0) {
            return Err(ConfigError::ValidationError(
                "output.top must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &VoteGraphConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = VoteGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
