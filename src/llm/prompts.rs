use crate::models::{Diagnosis, ReviewInput};

pub const SENTIMENT_SYSTEM_PROMPT: &str = r#"You classify customer reviews by sentiment.

Respond with valid JSON matching this exact schema:
{"sentiment": "positive" | "negative"}

Choose "negative" when the customer reports any problem, complaint or disappointment."#;

pub const DIAGNOSIS_SYSTEM_PROMPT: &str = r#"You analyze negative customer reviews and diagnose the underlying issue.

Respond with valid JSON matching this exact schema:
{
    "issueType": "UX" | "Performance" | "Bug" | "Other",
    "tone": "angry" | "sad" | "neutral" | "happy" | "other",
    "urgency": "low" | "medium" | "high"
}"#;

pub fn sentiment_prompt(review: &ReviewInput) -> String {
    format!(
        "Determine if the following review is positive or negative: {}",
        review.text()
    )
}

pub fn diagnosis_prompt(review: &ReviewInput) -> String {
    format!(
        "Analyze the following negative review and provide a diagnosis in terms of issue type, tone, and urgency. Review: \n{}",
        review.text()
    )
}

pub fn positive_response_prompt(review: &ReviewInput) -> String {
    format!(
        "Generate a positive response with warm thanks to the following review. Review: \n{}",
        review.text()
    )
}

pub fn negative_response_prompt(review: &ReviewInput, diagnosis: &Diagnosis) -> String {
    format!(
        "Generate a sympathetic response addressing the issues mentioned in the following review. \
         Review: {}\n\nThe customer reported a '{}' issue with a '{}' tone and '{}' urgency.",
        review.text(),
        diagnosis.issue_type(),
        diagnosis.tone(),
        diagnosis.urgency()
    )
}
