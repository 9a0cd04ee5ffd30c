//! Gateway-routed client: an OpenAI-compatible relay that fronts many
//! upstream models behind one endpoint and credential.

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::errors::Error;
use crate::model::ChatMessage;

use super::chat::ChatEndpoint;
use super::{CallOptions, ClientKind, LlmClient};

pub struct NextClient {
    endpoint: ChatEndpoint,
}

impl NextClient {
    pub fn new(model: &str, config: &ApiConfig) -> Result<Self, Error> {
        let provider = config
            .provider(ClientKind::Next)
            .ok_or_else(|| Error::config("api config has no 'next' section"))?;
        let api_key = provider
            .api_key
            .clone()
            .ok_or_else(|| Error::config("api config missing 'next.api_key'"))?;
        let base_url = provider
            .base_url
            .as_deref()
            .ok_or_else(|| Error::config("api config missing 'next.base_url'"))?;
        Ok(Self {
            endpoint: ChatEndpoint::new(model, base_url, Some(api_key)),
        })
    }
}

#[async_trait]
impl LlmClient for NextClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: &CallOptions,
    ) -> anyhow::Result<String> {
        self.endpoint.complete("next", messages, opts).await
    }

    fn provider_name(&self) -> &'static str {
        "next"
    }
}
