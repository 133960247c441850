mod fallback;
mod openai;

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use fallback::UnconfiguredProvider;
pub use openai::{OpenAiChatProvider, OpenAiConfig, DEFAULT_BASE_URL};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 220;
pub const DEFAULT_TEMPERATURE: f32 = 0.85;
pub const DEFAULT_PRESENCE_PENALTY: f32 = 0.6;
pub const DEFAULT_FREQUENCY_PENALTY: f32 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            presence_penalty: DEFAULT_PRESENCE_PENALTY,
            frequency_penalty: DEFAULT_FREQUENCY_PENALTY,
        }
    }
}

impl CompletionSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var("VERA_OPENAI_MODEL")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.model),
            max_tokens: env_or("VERA_MAX_TOKENS", defaults.max_tokens),
            temperature: env_or("VERA_TEMPERATURE", defaults.temperature),
            presence_penalty: env_or("VERA_PRESENCE_PENALTY", defaults.presence_penalty),
            frequency_penalty: env_or("VERA_FREQUENCY_PENALTY", defaults.frequency_penalty),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub settings: CompletionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("completion provider is not configured")]
    NotConfigured,
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }
}

/// Single-turn chat completion. `Ok(None)` means the provider answered but
/// produced no usable candidate text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError>;
}

pub fn provider_from_env() -> Result<Arc<dyn CompletionProvider>> {
    match OpenAiConfig::from_env() {
        Some(config) => Ok(Arc::new(OpenAiChatProvider::new(config)?)),
        None => {
            tracing::warn!("VERA_OPENAI_API_KEY not set, chat turns will use the fallback reply");
            Ok(Arc::new(UnconfiguredProvider))
        }
    }
}

/// Parses `key` from the environment, falling back to `default` when it is
/// unset or unparsable.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
