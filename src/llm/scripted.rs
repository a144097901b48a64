//! In-process completion provider used by unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::error::Result;
use crate::llm::prompts::{DIAGNOSIS_SYSTEM_PROMPT, SENTIMENT_SYSTEM_PROMPT};
use crate::llm::provider::{CompletionProvider, CompletionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Sentiment,
    Diagnosis,
    Reply,
}

impl CallKind {
    fn of(request: &CompletionRequest) -> Self {
        match request.system.as_deref() {
            Some(SENTIMENT_SYSTEM_PROMPT) => CallKind::Sentiment,
            Some(DIAGNOSIS_SYSTEM_PROMPT) => CallKind::Diagnosis,
            _ => CallKind::Reply,
        }
    }
}

type Responder = dyn Fn(CallKind, &str) -> Result<String> + Send + Sync;

pub(crate) struct ScriptedProvider {
    responder: Box<Responder>,
    calls: Mutex<Vec<(CallKind, String)>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(CallKind, &str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(CallKind, String)> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, kind: CallKind) -> usize {
        self.calls.lock().iter().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let kind = CallKind::of(&request);
        self.calls.lock().push((kind, request.prompt.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.responder)(kind, &request.prompt)
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}
