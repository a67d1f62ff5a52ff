//! LLM Provider implementations

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderConfig, Secrets};
use crate::error::{NatalError, Result};

/// Generic LLM provider trait
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// OpenAI-compatible chat completion provider (OpenAI, Zhipu and Ark all speak this)
pub struct ChatCompletionProvider {
    client: Client,
    label: String,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl ChatCompletionProvider {
    pub fn new(
        label: String,
        endpoint: String,
        model: String,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            label,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for ChatCompletionProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NatalError::Provider(format!(
                "{} returned HTTP {}: {}",
                self.label,
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let response: ChatResponse = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NatalError::Provider(format!("No response from {}", self.label)))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Build a provider from config, resolving its credential and model references
pub fn create_provider(config: &ProviderConfig, secrets: &Secrets) -> Result<Arc<dyn LlmProvider>> {
    let api_key = secrets.resolve(&config.api_key)?;
    let model = secrets.resolve(&config.model)?;

    let provider = ChatCompletionProvider::new(
        config.label.clone(),
        config.endpoint.clone(),
        model,
        api_key,
        config.timeout_secs.map(Duration::from_secs),
    )?;
    Ok(Arc::new(provider))
}
