//! OpenAI-compatible chat completions adapter
//!
//! Serves OpenAI itself plus every vendor exposing the same
//! `/chat/completions` shape (Groq, Mistral, xAI, DeepSeek, Ollama, ...).

use super::http::{join_url, status_error, transport_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use verdict_application::{AdapterError, BackendAdapter, Completion};
use verdict_domain::{AdapterClass, BackendKind, QueryConfig, TokenUsage};

pub struct OpenAiCompatibleAdapter {
    name: String,
    backend: BackendKind,
    class: AdapterClass,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(
        name: impl Into<String>,
        backend: BackendKind,
        class: AdapterClass,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            class,
            base_url: base_url.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Parse a chat completions body into a [`Completion`]
pub(crate) fn parse_chat_response(body: &str) -> Result<Completion, AdapterError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AdapterError::MalformedPayload(e.to_string()))?;
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(AdapterError::MalformedPayload("no choices in response".to_string()));
    };
    let text = choice.message.content.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AdapterError::MalformedPayload("empty completion".to_string()));
    }

    let mut completion = Completion::new(text);
    if let Some(usage) = response.usage {
        completion = completion.with_tokens(TokenUsage::new(
            usage.prompt_tokens,
            usage.completion_tokens,
        ));
    }
    if choice.finish_reason.as_deref() == Some("length") {
        completion = completion.truncated();
    }
    Ok(completion)
}

#[async_trait]
impl BackendAdapter for OpenAiCompatibleAdapter {
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
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let mut body = json!({
            "model": config.model,
            "messages": messages,
        });
        if let Some(temperature) = config.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let mut request = self
            .client
            .post(join_url(&self.base_url, "chat/completions"))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(adapter = %self.name, model = %config.model, "POST chat/completions");
        let resp = request.send().await.map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        parse_chat_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
        }"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.text, "4");
        assert_eq!(completion.tokens, TokenUsage::new(12, 1));
        assert!(!completion.truncated);
    }

    #[test]
    fn test_parse_truncated_response() {
        let body = r#"{"choices": [{"message": {"content": "The answer is"}, "finish_reason": "length"}]}"#;
        let completion = parse_chat_response(body).unwrap();
        assert!(completion.truncated);
        assert_eq!(completion.tokens, TokenUsage::default());
    }

    #[test]
    fn test_parse_rejects_empty_or_invalid() {
        assert!(matches!(
            parse_chat_response(r#"{"choices": []}"#),
            Err(AdapterError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_chat_response(r#"{"choices": [{"message": {"content": null}}]}"#),
            Err(AdapterError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_chat_response("<html>"),
            Err(AdapterError::MalformedPayload(_))
        ));
    }
}
