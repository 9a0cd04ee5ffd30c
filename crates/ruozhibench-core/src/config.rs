//! API configuration: one JSON file with an optional section per client
//! kind. Malformed or missing configuration is fatal — no silent defaults
//! for credentials.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::client::ClientKind;
use crate::errors::Error;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub openai: Option<ProviderConfig>,
    #[serde(default)]
    pub next: Option<ProviderConfig>,
    #[serde(default)]
    pub local: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ApiConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read api config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::config(format!(
                "failed to parse api config {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn provider(&self, kind: ClientKind) -> Option<&ProviderConfig> {
        match kind {
            ClientKind::OpenAi => self.openai.as_ref(),
            ClientKind::Next => self.next.as_ref(),
            ClientKind::Local => self.local.as_ref(),
        }
    }
}
