//! Shared chat-completions transport. All three client kinds speak the same
//! wire shape; they differ only in endpoint and credentials.

use serde_json::json;

use crate::model::ChatMessage;

use super::{CallOptions, ResponseFormat};

pub(super) struct ChatEndpoint {
    model: String,
    url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl ChatEndpoint {
    pub(super) fn new(model: &str, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            model: model.to_string(),
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            http: reqwest::Client::new(),
        }
    }

    pub(super) async fn complete(
        &self,
        provider: &str,
        messages: &[ChatMessage],
        opts: &CallOptions,
    ) -> anyhow::Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": opts.max_tokens,
        });
        if let Some(ResponseFormat::JsonObject) = opts.response_format {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let mut req = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("{} chat API error (status {}): {}", provider, status, error_text);
        }
        let json: serde_json::Value = resp.json().await?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("{} API response missing content", provider))?
            .to_string();

        Ok(text)
    }
}
