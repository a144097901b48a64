use chrono::{DateTime, Utc};
use serde::Serialize;

use super::diagnosis::Diagnosis;
use super::review::SentimentLabel;

/// Final output of one pipeline run.
///
/// Only the two constructors can build a record, so `diagnosis` is present
/// exactly when the sentiment is negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    sentiment: SentimentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnosis: Option<Diagnosis>,
    response: String,
    model: String,
    generated_at: DateTime<Utc>,
}

impl ResponseRecord {
    pub fn positive(response: String, model: impl Into<String>) -> Self {
        Self {
            sentiment: SentimentLabel::Positive,
            diagnosis: None,
            response,
            model: model.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn negative(diagnosis: Diagnosis, response: String, model: impl Into<String>) -> Self {
        Self {
            sentiment: SentimentLabel::Negative,
            diagnosis: Some(diagnosis),
            response,
            model: model.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn sentiment(&self) -> SentimentLabel {
        self.sentiment
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        self.diagnosis.as_ref()
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Urgency;

    #[test]
    fn test_constructors_uphold_diagnosis_invariant() {
        let positive = ResponseRecord::positive("Thanks!".to_string(), "m");
        assert_eq!(positive.sentiment(), SentimentLabel::Positive);
        assert!(positive.diagnosis().is_none());

        let negative = ResponseRecord::negative(
            Diagnosis::new("Bug", "angry", Urgency::High),
            "Sorry!".to_string(),
            "m",
        );
        assert_eq!(negative.sentiment(), SentimentLabel::Negative);
        assert_eq!(negative.diagnosis().map(|d| d.tone()), Some("angry"));
    }

    #[test]
    fn test_positive_record_omits_diagnosis_in_json() {
        let json = serde_json::to_value(ResponseRecord::positive("Thanks!".to_string(), "m")).unwrap();
        assert_eq!(json["sentiment"], "positive");
        assert!(json.get("diagnosis").is_none());
        assert_eq!(json["response"], "Thanks!");
    }
}
