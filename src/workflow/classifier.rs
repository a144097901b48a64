use std::str::FromStr;

use crate::error::{Error, Result};
use crate::llm::parser::parse_sentiment;
use crate::llm::prompts::{sentiment_prompt, SENTIMENT_SYSTEM_PROMPT};
use crate::llm::{CompletionRequest, ModelHandle};
use crate::models::{ReviewInput, SentimentLabel};

/// What to do when the model's answer is neither clearly positive nor negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Fail the invocation with `Error::Classification`.
    #[default]
    Reject,
    /// Route the review down the negative branch.
    AssumeNegative,
}

impl AmbiguityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguityPolicy::Reject => "reject",
            AmbiguityPolicy::AssumeNegative => "negative",
        }
    }

    fn apply(&self, err: Error) -> Result<SentimentLabel> {
        match (*self, err) {
            (AmbiguityPolicy::AssumeNegative, Error::Classification(reason)) => {
                tracing::warn!("Ambiguous sentiment, assuming negative: {}", reason);
                Ok(SentimentLabel::Negative)
            }
            (_, err) => Err(err),
        }
    }
}

impl FromStr for AmbiguityPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "error" => Ok(AmbiguityPolicy::Reject),
            "negative" | "assume-negative" | "assume_negative" => {
                Ok(AmbiguityPolicy::AssumeNegative)
            }
            other => Err(Error::Config(format!(
                "Unknown ambiguity policy '{}', expected 'reject' or 'negative'",
                other
            ))),
        }
    }
}

pub struct SentimentClassifier {
    model: ModelHandle,
    policy: AmbiguityPolicy,
}

impl SentimentClassifier {
    pub fn new(model: ModelHandle, policy: AmbiguityPolicy) -> Self {
        Self { model, policy }
    }

    pub async fn classify(&self, review: &ReviewInput) -> Result<SentimentLabel> {
        let request = CompletionRequest::json(SENTIMENT_SYSTEM_PROMPT, sentiment_prompt(review));
        let answer = self.model.complete(request).await?;

        parse_sentiment(&answer).or_else(|err| self.policy.apply(err))
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedProvider;
    use std::sync::Arc;

    fn review() -> ReviewInput {
        ReviewInput::new("It was fine, I guess?").unwrap()
    }

    #[tokio::test]
    async fn test_classify_sends_review_and_parses_label() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"sentiment": "positive"}"#));
        let classifier = SentimentClassifier::new(provider.clone(), AmbiguityPolicy::Reject);

        let label = classifier.classify(&review()).await.unwrap();
        assert_eq!(label, SentimentLabel::Positive);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("It was fine, I guess?"));
    }

    #[tokio::test]
    async fn test_ambiguous_answer_follows_policy() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"sentiment": "mixed"}"#));

        let strict = SentimentClassifier::new(provider.clone(), AmbiguityPolicy::Reject);
        assert!(matches!(
            strict.classify(&review()).await,
            Err(Error::Classification(_))
        ));

        let lenient = SentimentClassifier::new(provider, AmbiguityPolicy::AssumeNegative);
        assert_eq!(
            lenient.classify(&review()).await.unwrap(),
            SentimentLabel::Negative
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_masked_by_policy() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| {
            Err(Error::RateLimited("try later".to_string()))
        }));
        let classifier = SentimentClassifier::new(provider, AmbiguityPolicy::AssumeNegative);
        assert!(matches!(
            classifier.classify(&review()).await,
            Err(Error::RateLimited(_))
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Reject".parse::<AmbiguityPolicy>().unwrap(), AmbiguityPolicy::Reject);
        assert_eq!(
            "negative".parse::<AmbiguityPolicy>().unwrap(),
            AmbiguityPolicy::AssumeNegative
        );
        assert!("positive".parse::<AmbiguityPolicy>().is_err());

        for policy in [AmbiguityPolicy::Reject, AmbiguityPolicy::AssumeNegative] {
            assert_eq!(policy.as_str().parse::<AmbiguityPolicy>().unwrap(), policy);
        }
    }
}
