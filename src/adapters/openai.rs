use crate::adapters::read_json;
use crate::config::toml_config::LlmConfig;
use crate::domain::model::AnalysisPrompt;
use crate::domain::ports::SentimentClassifier;
use crate::utils::error::{Result, ReviewError, Service};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentiment classifier backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClassifier {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl OpenAiClassifier {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ReviewError::AuthenticationError {
                service: Service::Llm,
                message: "no OpenAI API key configured".to_string(),
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl SentimentClassifier for OpenAiClassifier {
    async fn classify(&self, prompt: &AnalysisPrompt) -> Result<String> {
        let user_prompt = prompt.render();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            "Sending request to {}: model={}, prompt_chars={}",
            self.endpoint,
            self.model,
            user_prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let completion: ChatResponse = read_json(response, Service::Llm, "chat/completions").await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ReviewError::TransportError {
                service: Service::Llm,
                status: None,
                message: "response contained no message content".to_string(),
            })?;

        tracing::debug!("Received response: {} chars", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
