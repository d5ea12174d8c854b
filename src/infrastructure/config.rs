use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::domain::ChunkSize;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

/// Runtime settings plus prompt templates, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// fastembed model name; the vector dimension follows from it.
    pub model: String,
    pub cache_dir: Option<PathBuf>,
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: ChunkSize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub assistant: AssistantPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
    pub empty_question_warning: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful AI assistant. Please respond to user queries in English, \
                     and help with the PDF content if relevant."
                .to_string(),
            empty_question_warning: "Please enter your question.".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `config.yaml` and `prompts.yaml` (paths overridable with
    /// `APP_CONFIG` / `APP_PROMPTS`), then applies environment overrides.
    /// Missing files fall back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("APP_PROMPTS").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut config: Config = read_yaml(Path::new(&config_path))?.unwrap_or_default();
        let prompts: PromptsConfig = read_yaml(Path::new(&prompts_path))?.unwrap_or_default();

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(Self { config, prompts })
    }

    /// The hosted model credential, resolved from the environment only.
    pub fn require_api_key() -> anyhow::Result<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{API_KEY_ENV} must be set to call the hosted model"))
    }
}

impl Config {
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid configuration")
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().context("SERVER_PORT must be a port number")?;
        }
        if let Some(size) = lookup("CHUNK_SIZE") {
            let words: usize = size
                .parse()
                .context("CHUNK_SIZE must be a positive integer")?;
            self.chunking.chunk_size = ChunkSize::new(words)?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(dir) = lookup("EMBEDDING_CACHE_DIR") {
            self.embedding.cache_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(None);
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = serde_yaml::from_str(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(parsed))
}
