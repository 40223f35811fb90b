use crate::config::TranslatorConfig;
use crate::domain::ports::{ChatMessage, ChatRequest, LanguageModel};
use crate::utils::error::{Result, TranslateError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// OpenAI 相容的 `/chat/completions` 後端
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

impl OpenAiChatClient {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.credential().map(str::to_string),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TranslateError::MissingConfigError {
                field: "api_key".to_string(),
            })?;

        let payload = CompletionPayload {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        tracing::debug!("Making model request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Model response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = upstream_error(status.as_u16(), &body);
            tracing::warn!("Model request failed: {}", error);
            return Err(error);
        }

        let json: Value = response.json().await?;
        completion_text(&json).ok_or_else(|| TranslateError::MalformedResponse {
            message: "response has no choices[0].message.content".to_string(),
        })
    }
}

fn completion_text(json: &Value) -> Option<String> {
    json.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// 盡量從上游錯誤內容取出可讀的訊息，並保留原始內容
fn upstream_error(status: u16, body: &str) -> TranslateError {
    let detail = serde_json::from_str::<Value>(body).ok();

    let message = detail
        .as_ref()
        .and_then(|json| {
            json.pointer("/error/message")
                .or_else(|| json.get("error").filter(|e| e.is_string()))
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("upstream returned status {}", status));

    let detail = detail.or_else(|| {
        let body = body.trim();
        (!body.is_empty()).then(|| Value::String(body.to_string()))
    });

    TranslateError::UpstreamError {
        status: Some(status),
        message,
        detail,
    }
}
