//! Direct-provider client against the OpenAI API.

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::errors::Error;
use crate::model::ChatMessage;

use super::chat::ChatEndpoint;
use super::{CallOptions, ClientKind, LlmClient};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    endpoint: ChatEndpoint,
}

impl OpenAiClient {
    pub fn new(model: &str, config: &ApiConfig) -> Result<Self, Error> {
        let provider = config
            .provider(ClientKind::OpenAi)
            .ok_or_else(|| Error::config("api config has no 'openai' section"))?;
        let api_key = provider
            .api_key
            .clone()
            .ok_or_else(|| Error::config("api config missing 'openai.api_key'"))?;
        let base_url = provider.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            endpoint: ChatEndpoint::new(model, base_url, Some(api_key)),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: &CallOptions,
    ) -> anyhow::Result<String> {
        self.endpoint.complete("openai", messages, opts).await
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
