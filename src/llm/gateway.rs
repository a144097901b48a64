//! Process-wide cache of completion-provider handles.
//!
//! Building a provider means building an HTTP client with its connection
//! pool, so handles are created at most once per distinct configuration and
//! shared by every request afterwards. The gateway is an ordinary value that
//! can be injected; [`ModelGateway::global`] is the instance used by the
//! binary.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::llm::gemini::GeminiProvider;
use crate::llm::groq::GroqProvider;
use crate::llm::provider::{ModelHandle, ProviderKind};

/// Fully resolved settings for one provider handle. This is the cache key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        let (api_key, base_url) = match config.provider {
            ProviderKind::Groq => (&config.groq_api_key, &config.groq_base_url),
            ProviderKind::Gemini => (&config.gemini_api_key, &config.gemini_base_url),
        };

        let api_key = api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} environment variable not set (required by the {} provider)",
                    config.provider.api_key_var(),
                    config.provider
                ))
            })?;

        Ok(Self {
            kind: config.provider,
            api_key: api_key.to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| config.provider.default_model().to_string()),
            base_url: base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub trait ProviderFactory: Send + Sync {
    fn build(&self, settings: &ProviderSettings) -> Result<ModelHandle>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&ProviderSettings) -> Result<ModelHandle> + Send + Sync,
{
    fn build(&self, settings: &ProviderSettings) -> Result<ModelHandle> {
        self(settings)
    }
}

/// Builds the real HTTP-backed providers.
pub struct HttpProviderFactory;

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, settings: &ProviderSettings) -> Result<ModelHandle> {
        let handle: ModelHandle = match settings.kind {
            ProviderKind::Groq => Arc::new(GroqProvider::new(
                settings.api_key.clone(),
                Some(settings.model.clone()),
                settings.base_url.clone(),
                settings.timeout_secs,
            )?),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(
                settings.api_key.clone(),
                Some(settings.model.clone()),
                settings.base_url.clone(),
                settings.timeout_secs,
            )?),
        };
        Ok(handle)
    }
}

pub struct ModelGateway {
    factory: Box<dyn ProviderFactory>,
    handles: Mutex<HashMap<ProviderSettings, ModelHandle>>,
    initializations: AtomicUsize,
}

static GLOBAL_GATEWAY: Lazy<ModelGateway> = Lazy::new(ModelGateway::new);

impl ModelGateway {
    pub fn new() -> Self {
        Self::with_factory(HttpProviderFactory)
    }

    pub fn with_factory(factory: impl ProviderFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            handles: Mutex::new(HashMap::new()),
            initializations: AtomicUsize::new(0),
        }
    }

    pub fn global() -> &'static ModelGateway {
        &GLOBAL_GATEWAY
    }

    /// Returns the cached handle for `config`, building it on first use.
    ///
    /// Fails with `Error::Config` when the selected provider's key is
    /// missing; nothing is cached in that case.
    pub fn get_handle(&self, config: &ModelConfig) -> Result<ModelHandle> {
        let settings = ProviderSettings::resolve(config)?;

        // The lock is held across the build so concurrent first calls
        // initialize exactly once.
        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get(&settings) {
            return Ok(Arc::clone(handle));
        }

        tracing::info!(
            "Initializing {} model handle ({})",
            settings.kind,
            settings.model
        );
        let handle = self.factory.build(&settings)?;
        self.initializations.fetch_add(1, Ordering::SeqCst);
        handles.insert(settings, Arc::clone(&handle));

        Ok(handle)
    }

    /// Number of handles this gateway has built.
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

impl Default for ModelGateway {
    fn default() -> Self {
        Self::new()
    }
}
