pub mod provider;
pub mod groq;
pub mod gemini;
pub mod gateway;
pub mod prompts;
pub mod parser;

#[cfg(test)]
pub(crate) mod scripted;

pub use provider::{CompletionProvider, CompletionRequest, ModelHandle, ProviderKind};
pub use groq::GroqProvider;
pub use gemini::GeminiProvider;
pub use gateway::{HttpProviderFactory, ModelGateway, ProviderFactory, ProviderSettings};
