use crate::error::{Error, Result};
use crate::llm::prompts::{negative_response_prompt, positive_response_prompt};
use crate::llm::{CompletionRequest, ModelHandle};
use crate::models::{Diagnosis, ReviewInput, SentimentLabel};

pub struct ResponseGenerator {
    model: ModelHandle,
}

impl ResponseGenerator {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    /// Writes the reply. A negative label requires the diagnosis and a
    /// positive one forbids it.
    pub async fn generate(
        &self,
        review: &ReviewInput,
        sentiment: SentimentLabel,
        diagnosis: Option<&Diagnosis>,
    ) -> Result<String> {
        let prompt = match (sentiment, diagnosis) {
            (SentimentLabel::Positive, None) => positive_response_prompt(review),
            (SentimentLabel::Negative, Some(diagnosis)) => {
                negative_response_prompt(review, diagnosis)
            }
            (SentimentLabel::Positive, Some(_)) => {
                return Err(Error::InvalidInput(
                    "A positive review must not carry a diagnosis".to_string(),
                ))
            }
            (SentimentLabel::Negative, None) => {
                return Err(Error::InvalidInput(
                    "A negative review needs a diagnosis before responding".to_string(),
                ))
            }
        };

        let reply = self.model.complete(CompletionRequest::text(prompt)).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(Error::ExternalService("Model returned an empty reply".to_string()));
        }

        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::{CallKind, ScriptedProvider};
    use crate::models::Urgency;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_negative_prompt_carries_diagnosis() {
        let provider = Arc::new(ScriptedProvider::replying("  We're sorry.  "));
        let generator = ResponseGenerator::new(provider.clone());
        let review = ReviewInput::new("Checkout keeps failing.").unwrap();
        let diagnosis = Diagnosis::new("Bug", "angry", Urgency::High);

        let reply = generator
            .generate(&review, SentimentLabel::Negative, Some(&diagnosis))
            .await
            .unwrap();
        assert_eq!(reply, "We're sorry.");

        let (kind, prompt) = provider.calls().remove(0);
        assert_eq!(kind, CallKind::Reply);
        assert!(prompt.contains("Checkout keeps failing."));
        assert!(prompt.contains("'Bug' issue"));
        assert!(prompt.contains("'angry' tone"));
        assert!(prompt.contains("'high' urgency"));
    }

    #[tokio::test]
    async fn test_positive_prompt_asks_for_thanks() {
        let provider = Arc::new(ScriptedProvider::replying("Thank you!"));
        let generator = ResponseGenerator::new(provider.clone());
        let review = ReviewInput::new("Great service.").unwrap();

        generator
            .generate(&review, SentimentLabel::Positive, None)
            .await
            .unwrap();
        assert!(provider.calls()[0].1.contains("warm thanks"));
    }

    #[tokio::test]
    async fn test_mismatched_inputs_never_reach_model() {
        let provider = Arc::new(ScriptedProvider::replying("unused"));
        let generator = ResponseGenerator::new(provider.clone());
        let review = ReviewInput::new("Meh.").unwrap();
        let diagnosis = Diagnosis::new("Other", "neutral", Urgency::Low);

        assert!(generator
            .generate(&review, SentimentLabel::Negative, None)
            .await
            .is_err());
        assert!(generator
            .generate(&review, SentimentLabel::Positive, Some(&diagnosis))
            .await
            .is_err());
        assert!(provider.calls().is_empty());
    }
}
