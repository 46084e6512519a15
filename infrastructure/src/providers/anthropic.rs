//! Anthropic messages API adapter

use super::http::{join_url, status_error, transport_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use verdict_application::{AdapterError, BackendAdapter, Completion};
use verdict_domain::{AdapterClass, BackendKind, QueryConfig, TokenUsage};

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The messages API requires `max_tokens`
const DEFAULT_MAX_TOKENS: u32 = 2048;

pub struct AnthropicAdapter {
    name: String,
    backend: BackendKind,
    class: AdapterClass,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(
        name: impl Into<String>,
        class: AdapterClass,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend: BackendKind::Anthropic,
            class,
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Parse a messages body; text blocks are concatenated in order
pub(crate) fn parse_messages_response(body: &str) -> Result<Completion, AdapterError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| AdapterError::MalformedPayload(e.to_string()))?;
    let text: String = response
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        return Err(AdapterError::MalformedPayload("no text content".to_string()));
    }

    let mut completion = Completion::new(text);
    if let Some(usage) = response.usage {
        completion =
            completion.with_tokens(TokenUsage::new(usage.input_tokens, usage.output_tokens));
    }
    if response.stop_reason.as_deref() == Some("max_tokens") {
        completion = completion.truncated();
    }
    Ok(completion)
}

#[async_trait]
impl BackendAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> &BackendKind {
        &self.backend
    }

    fn class(&self) -> AdapterClass {
        self.class
    }

    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        config: &QueryConfig,
    ) -> Result<Completion, AdapterError> {
        let mut body = json!({
            "model": config.model,
            "max_tokens": config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some(temperature) = config.temperature {
            // Anthropic accepts [0, 1]
            body["temperature"] = json!(temperature.min(1.0));
        }

        debug!(adapter = %self.name, model = %config.model, "POST v1/messages");
        let resp = self
            .client
            .post(join_url(&self.base_url, "v1/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        parse_messages_response(&text)
    }
}
