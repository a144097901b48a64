use crate::error::{Error, Result};
use crate::llm::ProviderKind;
use crate::workflow::AmbiguityPolicy;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub ambiguity_policy: AmbiguityPolicy,
    pub server_addr: String,
    pub concurrency_limit: usize,
}

/// Everything the model gateway needs to build a provider handle.
///
/// Credentials stay optional here; only the selected provider's key is
/// required, and that is checked when a handle is requested.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub groq_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("groq_base_url", &self.groq_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 4;

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            groq_api_key: None,
            gemini_api_key: None,
            groq_base_url: None,
            gemini_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match non_empty("REVIEW_PROVIDER") {
            Some(value) => value.parse::<ProviderKind>()?,
            None => ProviderKind::default(),
        };

        let ambiguity_policy = match non_empty("AMBIGUOUS_SENTIMENT") {
            Some(value) => value.parse::<AmbiguityPolicy>()?,
            None => AmbiguityPolicy::default(),
        };

        let timeout_secs = positive_number(
            "REQUEST_TIMEOUT_SECS",
            non_empty("REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;

        let concurrency_limit = positive_number(
            "CONCURRENCY_LIMIT",
            non_empty("CONCURRENCY_LIMIT"),
            DEFAULT_CONCURRENCY_LIMIT,
        )?;

        let server_addr =
            non_empty("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());

        let model = ModelConfig {
            provider,
            model: non_empty("REVIEW_MODEL"),
            groq_api_key: non_empty("GROQ_API_KEY"),
            gemini_api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY")),
            groq_base_url: non_empty("GROQ_BASE_URL"),
            gemini_base_url: non_empty("GEMINI_BASE_URL"),
            timeout_secs,
        };

        Ok(Self {
            model,
            ambiguity_policy,
            server_addr,
            concurrency_limit,
        })
    }
}

/// Parses a whole number greater than zero, falling back to `default` when unset.
fn positive_number<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr + PartialEq + Default,
{
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().parse::<T>() {
        Ok(number) if number != T::default() => Ok(number),
        _ => Err(Error::Config(format!(
            "{} must be a whole number greater than zero, got '{}'",
            key, value
        ))),
    }
}
