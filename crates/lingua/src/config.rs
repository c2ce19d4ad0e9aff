use lingua_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::StorageConfig;

/// Lingua configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinguaConfig {
    /// Base directory for all storage
    pub data_dir: String,

    /// Profile directory, relative to `data_dir`
    pub users_dir: String,

    /// Curriculum JSON document
    pub curriculum_path: String,

    /// Log level
    pub log_level: String,

    /// Where learner profiles live
    pub storage: StorageConfig,

    /// Dialogue practice settings
    pub ai: AiConfig,

    /// Curriculum shape and adaptation thresholds
    pub engine: EngineConfig,
}

impl Default for LinguaConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            users_dir: "users".to_string(),
            curriculum_path: "data/curriculum.json".to_string(),
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
            ai: AiConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl LinguaConfig {
    /// Load from configuration file; `.toml` files are read as TOML, anything else as JSON
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
        }
    }

    /// Read `.env`, then the file at `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Directory holding one JSON file per learner
    pub fn users_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.users_dir)
    }

    pub fn curriculum_file(&self) -> PathBuf {
        PathBuf::from(&self.curriculum_path)
    }

    /// Create the data and profile directories
    pub fn prepare_dirs(&self) -> anyhow::Result<()> {
        let users = self.users_path();
        std::fs::create_dir_all(&users).map_err(|e| {
            anyhow::anyhow!("Failed to create directory {}: {}", users.display(), e)
        })?;
        Ok(())
    }

    /// Check engine settings and that the curriculum file exists
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if !self.curriculum_file().is_file() {
            anyhow::bail!("Curriculum file not found: {}", self.curriculum_path);
        }
        if self.ai.timeout_secs == 0 {
            anyhow::bail!("ai.timeout_secs must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            anyhow::bail!("ai.temperature must be within 0.0..=2.0");
        }
        Ok(())
    }
}

/// Settings for the OpenRouter-compatible chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Use the remote model; when off, dialogue answers come from the template
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "tngtech/deepseek-r1t2-chimera:free".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 30,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}

impl AiConfig {
    /// API key from the environment, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
