//! OpenAI-compatible chat-completions provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::LlmError;
use super::prompt::{user_prompt, SYSTEM_PROMPT};
use super::LlmProvider;
use crate::config::LlmConfig;
use crate::task::{next_task_id, Task};

/// Generates tasks through any OpenAI-compatible `/chat/completions` API.
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiProvider {
    pub const ID: &'static str = "openai";

    /// Create a provider. The client enforces `config.timeout` on every call.
    pub fn new(config: &LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Execute one completion request and return the message content.
    async fn request_content(&self) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        tracing::debug!("Sending task generation request: model={}", self.model);

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::parse_error("Empty response from LLM".to_string()))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn generate_task(&self) -> anyhow::Result<Task> {
        let content = self.request_content().await?;
        let payload: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            LlmError::parse_error(format!("Task content is not JSON: {}, content: {}", e, content))
        })?;
        let task = Task::from_payload(&payload, next_task_id()).ok_or_else(|| {
            LlmError::parse_error(format!("Task content is not a JSON object: {}", content))
        })?;
        Ok(task)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
