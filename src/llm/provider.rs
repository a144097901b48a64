use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A shared, ready-to-use handle to a hosted completion service.
pub type ModelHandle = Arc<dyn CompletionProvider>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Groq's OpenAI-compatible chat completions API.
    #[default]
    Groq,
    /// Google's Gemini generateContent API.
    Gemini,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "openai/gpt-oss-120b",
            ProviderKind::Gemini => "gemini-3-flash-preview",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(Error::Config(format!(
                "Unknown provider '{}', expected 'groq' or 'gemini'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Groq => write!(f, "Groq"),
            ProviderKind::Gemini => write!(f, "Gemini"),
        }
    }
}

/// Output budgets include hidden reasoning tokens on reasoning models such as
/// the default Groq model, so even a one-word JSON answer needs headroom.
pub const JSON_MAX_TOKENS: u32 = 2048;
pub const TEXT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    /// Ask the provider to constrain its output to a JSON object.
    pub json_output: bool,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            json_output: false,
            max_tokens: TEXT_MAX_TOKENS,
        }
    }

    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            prompt: prompt.into(),
            json_output: true,
            max_tokens: JSON_MAX_TOKENS,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
    fn model(&self) -> &str;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("groq".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert_eq!(" GEMINI ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("cohere".parse::<ProviderKind>().is_err());
    }
}
