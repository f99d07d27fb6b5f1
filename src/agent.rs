//! LLM agent module for markdown summarization.
//!
//! Talks to an OpenAI-compatible chat completion endpoint (Groq by default).

use crate::config::SummarizerConfig;
use crate::provider::{self, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "summarizer";

#[async_trait]
pub trait SummarizerClient: Send + Sync {
    /// Turn the prompts into generated text. Output is only as deterministic
    /// as the provider's sampling at the given temperature.
    async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion client for Groq's OpenAI-compatible API.
pub struct GroqSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqSummarizer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = provider::create_client().map_err(ProviderError::request(PROVIDER))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &SummarizerConfig, api_key: &str) -> Result<Self, ProviderError> {
        Self::new(&config.base_url, api_key, &config.model)
    }
}

#[async_trait]
impl SummarizerClient for GroqSummarizer {
    async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ProviderError::invalid_request(
                PROVIDER,
                format!("temperature {temperature} is outside [0, 2]"),
            ));
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };
        tracing::debug!(
            model = %self.model,
            max_tokens,
            temperature,
            prompt_chars = user_prompt.chars().count(),
            "summarizer.request"
        );

        let response = self
            .client
            .post(provider::endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;

        let parsed: ChatResponse = provider::read_json(PROVIDER, response).await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ProviderError::content_missing(PROVIDER, "completion has no text"))
    }
}
