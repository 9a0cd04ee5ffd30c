//! Pluggable LLM clients. Three interchangeable kinds sit behind one trait:
//! direct provider (`openai`), gateway-routed (`next`), and a local
//! OpenAI-compatible inference server (`local`). Selection happens once, in
//! [`build_client`], not at call sites.

mod chat;
pub mod local;
pub mod next;
pub mod openai;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::errors::Error;
use crate::model::{ChatMessage, Role};

pub use local::LocalClient;
pub use next::NextClient;
pub use openai::OpenAiClient;

/// Per-call knobs passed through to the underlying model call.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub response_format: Option<ResponseFormat>,
}

impl CallOptions {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            response_format: None,
        }
    }

    pub fn with_json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }
}

/// Structured-output hint forwarded to providers that understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    JsonObject,
}

/// A single chat completion against some provider. Batching, retries, and
/// validation live in [`crate::dispatch`]; implementations only need to turn
/// one message sequence into one raw response string.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: &CallOptions,
    ) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    OpenAi,
    Next,
    Local,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::OpenAi => "openai",
            ClientKind::Next => "next",
            ClientKind::Local => "local",
        }
    }
}

impl FromStr for ClientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ClientKind::OpenAi),
            "next" => Ok(ClientKind::Next),
            "local" => Ok(ClientKind::Local),
            other => Err(Error::UnknownClient(other.to_string())),
        }
    }
}

/// Construct a client for the selected kind, validating that the api config
/// carries what that kind needs. The only place kind selection branches.
pub fn build_client(
    kind: ClientKind,
    model: &str,
    config: &ApiConfig,
) -> Result<Arc<dyn LlmClient>, Error> {
    match kind {
        ClientKind::OpenAi => Ok(Arc::new(OpenAiClient::new(model, config)?)),
        ClientKind::Next => Ok(Arc::new(NextClient::new(model, config)?)),
        ClientKind::Local => Ok(Arc::new(LocalClient::new(model, config))),
    }
}

/// Wrap bare prompt strings into message sequences under a shared system
/// role — the collection-side entry point of the client interface.
pub fn construct_message_list(prompts: Vec<String>, system_role: &str) -> Vec<Vec<ChatMessage>> {
    prompts
        .into_iter()
        .map(|p| {
            vec![
                ChatMessage {
                    role: Role::System,
                    content: system_role.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: p,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_kind_round_trips() {
        for kind in ["openai", "next", "local"] {
            assert_eq!(kind.parse::<ClientKind>().unwrap().as_str(), kind);
        }
        assert!(matches!(
            "azure".parse::<ClientKind>(),
            Err(Error::UnknownClient(_))
        ));
    }

    #[test]
    fn message_list_pairs_system_and_user() {
        let msgs = construct_message_list(vec!["a".into(), "b".into()], "sys");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0][0].role, Role::System);
        assert_eq!(msgs[0][0].content, "sys");
        assert_eq!(msgs[1][1].content, "b");
    }

    #[test]
    fn build_client_requires_provider_section() {
        let config = ApiConfig::default();
        assert!(matches!(
            OpenAiClient::new("gpt-4o-mini", &config),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            NextClient::new("gpt-4o-mini", &config),
            Err(Error::Config(_))
        ));
        // Local runs credential-free with a default endpoint.
        let local = LocalClient::new("llama", &config);
        assert_eq!(local.provider_name(), "local");
    }
}
