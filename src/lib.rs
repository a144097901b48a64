pub mod config;
pub mod error;
pub mod models;
pub mod llm;
pub mod workflow;
pub mod web;

pub use config::{Config, ModelConfig};
pub use error::{Error, ErrorKind, Result};
pub use llm::{CompletionProvider, ModelGateway, ModelHandle, ProviderKind};
pub use models::{Diagnosis, ResponseRecord, ReviewInput, SentimentLabel, Urgency};
pub use workflow::{AmbiguityPolicy, ReviewPipeline};
