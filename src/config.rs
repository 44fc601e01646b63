//! Viewer and model-provider configuration
//!
//! `ViewerConfig` carries everything the binary needs to start serving.
//! `ModelConfig` describes the optional LLM behind the analysis features;
//! it is built either explicitly or from environment variables.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::{ViewerError, ViewerResult};

pub const DEFAULT_STORAGE_DIR: &str = "./sessions";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

pub const ENV_PROVIDER: &str = "SESSION_VIEWER_PROVIDER";
pub const ENV_MODEL: &str = "SESSION_VIEWER_MODEL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";

const ANTHROPIC_DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
const ANTHROPIC_MAX_TOKENS: u32 = 4000;
const ANTHROPIC_THINKING_BUDGET: u32 = 1024;
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

const OPENAI_DEFAULT_MODEL: &str = "gpt-5-mini-2025-08-07";
const OPENAI_MAX_TOKENS: u32 = 16000;
const OPENAI_REASONING_EFFORT: &str = "medium";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const OLLAMA_DEFAULT_MODEL: &str = "qwen3:4b";
const OLLAMA_DEFAULT_HOST: &str = "http://localhost:11434";

/// Ollama models known to work, with their context limits
const OLLAMA_MODELS: &[(&str, u32)] = &[
    ("qwen3:4b", 128_000),
    ("llama3.1:latest", 128_000),
    ("gemma3n:e4b", 8_000),
];

/// Ollama models that cannot call tools
const OLLAMA_NO_TOOLS: &[&str] = &["gemma3n:e4b"];

/// Top-level runtime configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Root directory holding `session_*` directories
    pub storage_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Open the UI in a browser once the server is up
    pub open_browser: bool,
    /// Model for AI analysis; `None` disables it
    pub model: Option<ModelConfig>,
}

impl ViewerConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            open_browser: true,
            model: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    pub fn with_model(mut self, model: Option<ModelConfig>) -> Self {
        self.model = model;
        self
    }

    /// Address to bind, e.g. `0.0.0.0:8000`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL to show users and open in the browser
    ///
    /// A wildcard bind address is not browsable, so it becomes `localhost`.
    pub fn display_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            host => host,
        };
        format!("http://{}:{}", host, self.port)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_DIR)
    }
}

/// Which API a model is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ViewerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ViewerError::invalid_config(format!(
                "Unknown provider '{}'. Must be one of: anthropic, openai, ollama",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings for the model behind AI analysis
#[derive(Clone)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model_id: String,
    /// Not needed for Ollama
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Extended thinking budget (Anthropic only)
    pub thinking_budget: Option<u32>,
    /// Reasoning effort hint (OpenAI only)
    pub reasoning_effort: Option<String>,
    /// Whether the model can be handed tools
    pub supports_tools: bool,
}

impl ModelConfig {
    /// Claude via the Anthropic Messages API, with extended thinking
    pub fn anthropic(api_key: impl Into<String>, model_id: Option<&str>) -> ViewerResult<Self> {
        let config = Self {
            provider: ProviderKind::Anthropic,
            model_id: model_id.unwrap_or(ANTHROPIC_DEFAULT_MODEL).to_string(),
            api_key: Some(api_key.into()),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            max_tokens: ANTHROPIC_MAX_TOKENS,
            temperature: Some(1.0),
            thinking_budget: Some(ANTHROPIC_THINKING_BUDGET),
            reasoning_effort: None,
            supports_tools: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// An OpenAI chat-completions model
    pub fn openai(api_key: impl Into<String>, model_id: Option<&str>) -> ViewerResult<Self> {
        let config = Self {
            provider: ProviderKind::OpenAi,
            model_id: model_id.unwrap_or(OPENAI_DEFAULT_MODEL).to_string(),
            api_key: Some(api_key.into()),
            base_url: OPENAI_BASE_URL.to_string(),
            max_tokens: OPENAI_MAX_TOKENS,
            temperature: None,
            thinking_budget: None,
            reasoning_effort: Some(OPENAI_REASONING_EFFORT.to_string()),
            supports_tools: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// A local Ollama model from the supported list
    pub fn ollama(host: Option<&str>, model_id: Option<&str>) -> ViewerResult<Self> {
        let model_id = model_id.unwrap_or(OLLAMA_DEFAULT_MODEL);
        let max_tokens = OLLAMA_MODELS
            .iter()
            .find(|(id, _)| *id == model_id)
            .map(|(_, limit)| *limit)
            .ok_or_else(|| {
                let supported: Vec<&str> = OLLAMA_MODELS.iter().map(|(id, _)| *id).collect();
                ViewerError::invalid_config(format!(
                    "Unsupported Ollama model: {}. Supported models: {}",
                    model_id,
                    supported.join(", ")
                ))
            })?;

        let supports_tools = !OLLAMA_NO_TOOLS.contains(&model_id);
        if !supports_tools {
            tracing::warn!(model = model_id, "Model does not support tools; analysis runs without them");
        }

        let host = host.unwrap_or(OLLAMA_DEFAULT_HOST).trim_end_matches('/');
        let config = Self {
            provider: ProviderKind::Ollama,
            model_id: model_id.to_string(),
            api_key: None,
            base_url: format!("{}/v1", host),
            max_tokens,
            temperature: None,
            thinking_budget: None,
            reasoning_effort: None,
            supports_tools,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the thinking budget (Anthropic)
    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> ViewerResult<Self> {
        self.thinking_budget = budget;
        self.validate()?;
        Ok(self)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> ViewerResult<Self> {
        self.max_tokens = max_tokens;
        self.validate()?;
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check the invariants between fields
    pub fn validate(&self) -> ViewerResult<()> {
        if self.model_id.trim().is_empty() {
            return Err(ViewerError::invalid_config("model id must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(ViewerError::invalid_config("max_tokens must be positive"));
        }
        if let Some(budget) = self.thinking_budget {
            if budget >= self.max_tokens {
                return Err(ViewerError::invalid_config(format!(
                    "thinking budget ({}) must be less than max_tokens ({})",
                    budget, self.max_tokens
                )));
            }
        }
        if self.provider != ProviderKind::Ollama && self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ViewerError::invalid_config(format!(
                "{} requires an API key",
                self.provider
            )));
        }
        Ok(())
    }

    /// Build from the process environment
    ///
    /// Returns `Ok(None)` when no provider is selected and no API key is set.
    pub fn from_env() -> ViewerResult<Option<Self>> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> ViewerResult<Option<Self>> {
        let get = |key: &str| {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let model_id = get(ENV_MODEL);
        let provider = match get(ENV_PROVIDER) {
            Some(name) => name.parse::<ProviderKind>()?,
            None if get(ENV_ANTHROPIC_API_KEY).is_some() => ProviderKind::Anthropic,
            None if get(ENV_OPENAI_API_KEY).is_some() => ProviderKind::OpenAi,
            None => return Ok(None),
        };

        let config = match provider {
            ProviderKind::Anthropic => {
                let key = get(ENV_ANTHROPIC_API_KEY).ok_or_else(|| {
                    ViewerError::invalid_config(format!("{} is not set", ENV_ANTHROPIC_API_KEY))
                })?;
                Self::anthropic(key, model_id)?
            }
            ProviderKind::OpenAi => {
                let key = get(ENV_OPENAI_API_KEY).ok_or_else(|| {
                    ViewerError::invalid_config(format!("{} is not set", ENV_OPENAI_API_KEY))
                })?;
                Self::openai(key, model_id)?
            }
            ProviderKind::Ollama => Self::ollama(get(ENV_OLLAMA_HOST), model_id)?,
        };

        Ok(Some(config))
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("thinking_budget", &self.thinking_budget)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("supports_tools", &self.supports_tools)
            .finish()
    }
}
