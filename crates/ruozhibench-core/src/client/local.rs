//! Local-inference client: an OpenAI-compatible server (vLLM or similar) on
//! this machine. No credential required.

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::model::ChatMessage;

use super::chat::ChatEndpoint;
use super::{CallOptions, ClientKind, LlmClient};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

pub struct LocalClient {
    endpoint: ChatEndpoint,
}

impl LocalClient {
    pub fn new(model: &str, config: &ApiConfig) -> Self {
        let base_url = config
            .provider(ClientKind::Local)
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        let api_key = config
            .provider(ClientKind::Local)
            .and_then(|p| p.api_key.clone());
        Self {
            endpoint: ChatEndpoint::new(model, base_url, api_key),
        }
    }
}

#[async_trait]
impl LlmClient for LocalClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: &CallOptions,
    ) -> anyhow::Result<String> {
        self.endpoint.complete("local", messages, opts).await
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}
