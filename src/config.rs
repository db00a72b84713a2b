use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".studentrag";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the Chroma-style vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the index service
    #[serde(default = "default_index_url")]
    pub url: String,

    #[serde(default = "default_tenant")]
    pub tenant: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Upper bound on the document snapshot fetched for keyword scanning
    #[serde(default = "default_max_snapshot")]
    pub max_snapshot: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            tenant: default_tenant(),
            database: default_database(),
            max_snapshot: default_max_snapshot(),
        }
    }
}

fn default_index_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tenant() -> String {
    "default_tenant".to_string()
}

fn default_database() -> String {
    "default_database".to_string()
}

fn default_max_snapshot() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_model() -> String {
    "bge-base-en-v1.5".to_string()
}

fn default_batch_size() -> usize {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Collection searched when the CLI is not told otherwise
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Default number of results to return
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            default_limit: default_search_limit(),
        }
    }
}

fn default_collection() -> String {
    "dtu-students-proper".to_string()
}

fn default_search_limit() -> usize {
    10
}

/// The canned query sweep run by `studentrag batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_queries")]
    pub queries: Vec<String>,

    /// Delay between queries, to avoid hammering the index
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Result limit per query
    #[serde(default = "default_batch_limit")]
    pub limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            queries: default_batch_queries(),
            throttle_ms: default_throttle_ms(),
            limit: default_batch_limit(),
        }
    }
}

fn default_batch_queries() -> Vec<String> {
    [
        "Google",
        "Microsoft",
        "software engineer",
        "data scientist",
        "Bangalore",
        "Policybazaar",
        "ciena",
        "product manager",
        "internship",
        "Amazon",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_batch_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable file logging
    #[serde(default)]
    pub enabled: bool,

    /// Mirror logs to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory, relative to the project root unless absolute
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Rotation strategy: hourly, daily, minutely, or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: default_true(),
            level: default_log_level(),
            directory: default_log_directory(),
            rotation: default_rotation(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".studentrag/logs")
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_file_prefix() -> String {
    "studentrag.log".to_string()
}

impl Config {
    /// Load configuration from the .studentrag directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .studentrag directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }
}
