use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CategoryAgentError, Result};
use crate::llm::{LlmBackend, LlmConfig};
use crate::traversal::{TraversalOptions, DEFAULT_MAX_STEPS};

const CONFIG_FILE: &str = "config.toml";

/// Default taxonomy file name inside the base directory
pub const DEFAULT_TAXONOMY_FILE: &str = "categories.txt";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# category-agent configuration file
# Location: ~/.category-agent/config.toml

[llm]
# Backend that makes the per-level decisions: "claude" (Claude CLI) or "openai"
backend = "claude"

# Model name. Omit to use the backend default (openai: gpt-4.1)
# model = "gpt-4.1"

# Sampling temperature (openai only)
temperature = 0.0

# Request timeout in seconds
timeout_seconds = 60

# OpenAI-compatible chat completions endpoint
api_base_url = "https://api.openai.com/v1/chat/completions"

# Environment variable holding the API key (a .env file is also read)
api_key_env = "OPENAI_API_KEY"

[traversal]
# Maximum number of decisions per classification
max_steps = 32

[taxonomy]
# Category paths, one per line, segments separated by " > "
# Default: ~/.category-agent/categories.txt (built-in samples when missing)
# file = "/path/to/categories.txt"
"#;

/// Global configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

/// Traversal-related configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Upper bound on decisions per classification
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Taxonomy source configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Path to the categories file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| CategoryAgentError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Taxonomy file to load: configured path, or the default file when it exists
    pub fn taxonomy_file(&self, base_dir: &Path) -> Option<PathBuf> {
        if let Some(file) = &self.taxonomy.file {
            return Some(file.clone());
        }

        let default = base_dir.join(DEFAULT_TAXONOMY_FILE);
        default.exists().then_some(default)
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            max_steps: self.traversal.max_steps,
        }
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || CategoryAgentError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "llm.backend" => self.llm.backend = value.parse::<LlmBackend>()?,
            "llm.model" => self.llm.model = non_empty(value),
            "llm.temperature" => self.llm.temperature = value.trim().parse().map_err(|_| invalid())?,
            "llm.timeout_seconds" => {
                self.llm.timeout_seconds = value.trim().parse().map_err(|_| invalid())?
            }
            "llm.api_base_url" => self.llm.api_base_url = value.trim().to_string(),
            "llm.api_key_env" => self.llm.api_key_env = value.trim().to_string(),
            "traversal.max_steps" => {
                let max_steps: usize = value.trim().parse().map_err(|_| invalid())?;
                if max_steps == 0 {
                    return Err(invalid());
                }
                self.traversal.max_steps = max_steps;
            }
            "taxonomy.file" => self.taxonomy.file = non_empty(value).map(PathBuf::from),
            _ => {
                return Err(CategoryAgentError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("llm.backend".to_string(), self.llm.backend.to_string()),
            (
                "llm.model".to_string(),
                self.llm.model.clone().unwrap_or_default(),
            ),
            (
                "llm.temperature".to_string(),
                self.llm.temperature.to_string(),
            ),
            (
                "llm.timeout_seconds".to_string(),
                self.llm.timeout_seconds.to_string(),
            ),
            ("llm.api_base_url".to_string(), self.llm.api_base_url.clone()),
            ("llm.api_key_env".to_string(), self.llm.api_key_env.clone()),
            (
                "traversal.max_steps".to_string(),
                self.traversal.max_steps.to_string(),
            ),
            (
                "taxonomy.file".to_string(),
                self.taxonomy
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_parses_to_default() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = Config::init(dir.path()).unwrap();
        assert_eq!(path, Config::path(dir.path()));
        assert!(path.exists());

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.traversal.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("llm.backend", "openai").unwrap();
        config.set("traversal.max_steps", "8").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.llm.backend, LlmBackend::OpenAi);
        assert_eq!(loaded.traversal_options().max_steps, 8);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(Config::path(dir.path()), "[llm\nbackend = ").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(CategoryAgentError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("llm.model", "gpt-4.1-mini").unwrap();
        assert_eq!(config.get("llm.model").unwrap(), "gpt-4.1-mini");

        config.set("llm.model", "").unwrap();
        assert_eq!(config.llm.model, None);

        config.set("taxonomy.file", "/tmp/categories.txt").unwrap();
        assert_eq!(
            config.taxonomy.file,
            Some(PathBuf::from("/tmp/categories.txt"))
        );

        assert!(config.get("llm.unknown").is_none());
    }

    #[test]
    fn test_config_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("traversal.max_steps", "0"),
            Err(CategoryAgentError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("llm.timeout_seconds", "soon"),
            Err(CategoryAgentError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("llm.backend", "gemini"),
            Err(CategoryAgentError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("llm.provider", "local"),
            Err(CategoryAgentError::ConfigKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_taxonomy_file_resolution() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        assert_eq!(config.taxonomy_file(dir.path()), None);

        let default = dir.path().join(DEFAULT_TAXONOMY_FILE);
        fs::write(&default, "Pantry > Bread\n").unwrap();
        assert_eq!(config.taxonomy_file(dir.path()), Some(default));

        config.taxonomy.file = Some(PathBuf::from("/elsewhere/categories.txt"));
        assert_eq!(
            config.taxonomy_file(dir.path()),
            Some(PathBuf::from("/elsewhere/categories.txt"))
        );
    }
}
