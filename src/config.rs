use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub agent: AgentSettings,
    pub rag: RagConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_ms: 300000,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_iterations: u32,
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub store_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 20,
            top_k: 3,
            store_dir: PathBuf::from("vector_store"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            agent: AgentSettings::default(),
            rag: RagConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Log filter directives: `--verbose` wins, then a non-empty `RUST_LOG`, then `log_level`
    pub fn log_filter(&self, verbose: bool, rust_log: Option<String>) -> String {
        if verbose {
            return "debug".to_string();
        }
        rust_log
            .filter(|v| !v.is_empty())
            .or_else(|| self.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    }

    /// Apply `OPENAI_MODEL` / `OPENAI_BASE_URL` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.is_empty()) {
            log::debug!("Model overridden from environment: {}", model);
            self.llm.model = model;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|v| !v.is_empty()) {
            log::debug!("Base URL overridden from environment: {}", base_url);
            self.llm.base_url = base_url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.rag.chunk_overlap, 20);
        assert_eq!(config.rag.top_k, 3);
    }

    #[test]
    fn test_load_explicit_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agentlab.yml");
        fs::write(
            &path,
            "llm:\n  model: deepseek-chat\n  base_url: https://api.deepseek.com\nagent:\n  max_iterations: 3\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.base_url, "https://api.deepseek.com");
        assert_eq!(config.agent.max_iterations, 3);
        // Unspecified fields keep defaults
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.rag.top_k, 3);
    }

    #[test]
    fn test_log_filter_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agentlab.yml");
        fs::write(&path, "log_level: warn\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.log_filter(false, None), "warn");
        assert_eq!(config.log_filter(false, Some(String::new())), "warn");
        assert_eq!(config.log_filter(false, Some("agentlab=trace".to_string())), "agentlab=trace");
        assert_eq!(config.log_filter(true, Some("error".to_string())), "debug");

        let unset = Config {
            log_level: None,
            ..Config::default()
        };
        assert_eq!(unset.log_filter(false, None), "info");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "llm: [unclosed").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [("OPENAI_MODEL", "qwen-plus"), ("OPENAI_BASE_URL", "http://localhost:8080/v1")]
            .into_iter()
            .collect();
        let config = Config::default().with_overrides_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.llm.model, "qwen-plus");
        assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_empty_env_override_ignored() {
        let config = Config::default().with_overrides_from(|_| Some(String::new()));
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }
}
