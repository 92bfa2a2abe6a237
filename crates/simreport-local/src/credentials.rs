//! API credentials for the remote collaborators.
//!
//! Three credential strings under fixed names, resolved in order: explicit
//! value, environment (a `SIMREPORT_`-prefixed name then the conventional
//! one), then the persisted credential file. Empty or whitespace-only values
//! count as missing at every layer.

use serde::{Deserialize, Serialize};
use simreport_core::{Error, Result};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    OpenRouter,
    GitHub,
    Tavily,
}

impl Credential {
    pub const ALL: [Credential; 3] = [Credential::OpenRouter, Credential::GitHub, Credential::Tavily];

    /// Fixed key name, also used as the field name in the credential file.
    pub fn name(self) -> &'static str {
        match self {
            Credential::OpenRouter => "openrouter_api_key",
            Credential::GitHub => "github_token",
            Credential::Tavily => "tavily_api_key",
        }
    }

    fn env_names(self) -> [&'static str; 2] {
        match self {
            Credential::OpenRouter => ["SIMREPORT_OPENROUTER_API_KEY", "OPENROUTER_API_KEY"],
            Credential::GitHub => ["SIMREPORT_GITHUB_TOKEN", "GITHUB_TOKEN"],
            Credential::Tavily => ["SIMREPORT_TAVILY_API_KEY", "TAVILY_API_KEY"],
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn from_env(credential: Credential) -> Option<String> {
    credential
        .env_names()
        .into_iter()
        .find_map(|name| std::env::var(name).ok().as_deref().and_then(non_empty))
}

/// On-disk credential file, plain JSON managed by the CLI.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openrouter_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tavily_api_key: Option<String>,
}

impl CredentialStore {
    /// Load the store; a missing file is an empty store, not an error.
    pub fn load(path: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, raw)
    }

    pub fn get(&self, credential: Credential) -> Option<String> {
        let stored = match credential {
            Credential::OpenRouter => self.openrouter_api_key.as_deref(),
            Credential::GitHub => self.github_token.as_deref(),
            Credential::Tavily => self.tavily_api_key.as_deref(),
        };
        stored.and_then(non_empty)
    }

    pub fn set(&mut self, credential: Credential, value: impl Into<String>) {
        let value = non_empty(&value.into());
        match credential {
            Credential::OpenRouter => self.openrouter_api_key = value,
            Credential::GitHub => self.github_token = value,
            Credential::Tavily => self.tavily_api_key = value,
        }
    }

    pub fn clear(&mut self, credential: Credential) {
        match credential {
            Credential::OpenRouter => self.openrouter_api_key = None,
            Credential::GitHub => self.github_token = None,
            Credential::Tavily => self.tavily_api_key = None,
        }
    }
}

/// Resolve a credential: explicit value, then environment, then the store.
pub fn resolve(
    credential: Credential,
    explicit: Option<&str>,
    store: &CredentialStore,
) -> Option<String> {
    explicit
        .and_then(non_empty)
        .or_else(|| from_env(credential))
        .or_else(|| store.get(credential))
}

/// Like [`resolve`], but a missing credential is a typed error naming the key.
pub fn require(
    credential: Credential,
    explicit: Option<&str>,
    store: &CredentialStore,
) -> Result<String> {
    resolve(credential, explicit, store)
        .ok_or_else(|| Error::NotConfigured(credential.name().to_string()))
}
