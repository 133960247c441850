use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{env_or, CompletionProvider, CompletionRequest, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("VERA_OPENAI_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())?;
        let base_url = env::var("VERA_OPENAI_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Some(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(env_or("VERA_HTTP_TIMEOUT_SECONDS", 20)),
        })
    }
}

#[derive(Clone)]
pub struct OpenAiChatProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiChatProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChatProvider {
    fn name(&self) -> &'static str {
        "openai_chat"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.as_str())
            .json(&ChatCompletionBody::from_request(request))
            .send()
            .await
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| ProviderError::Decode(error.to_string()))?;

        if let Some(usage) = parsed.usage.as_ref() {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        Ok(parsed.first_candidate_text())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionBody<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: request.settings.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system.as_str(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user.as_str(),
                },
            ],
            max_tokens: request.settings.max_tokens,
            temperature: request.settings.temperature,
            presence_penalty: request.settings.presence_penalty,
            frequency_penalty: request.settings.frequency_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl ChatCompletionResponse {
    fn first_candidate_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|text| !text.trim().is_empty())
    }
}
