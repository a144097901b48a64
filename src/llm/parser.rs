use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Diagnosis, SentimentLabel};

/// Maps a classifier answer onto the closed label set.
///
/// Accepts a JSON object with a `sentiment` (or `label`) field, or a bare
/// one-word answer. Anything else is reported as `Error::Classification`.
pub fn parse_sentiment(response: &str) -> Result<SentimentLabel> {
    if let Ok(json_str) = extract_json(response) {
        let value: Value = serde_json::from_str(&json_str)
            .map_err(|e| Error::Classification(format!("Malformed sentiment JSON: {}", e)))?;

        let label = value
            .get("sentiment")
            .or_else(|| value.get("label"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Classification(format!("No sentiment field in '{}'", json_str))
            })?;

        return label
            .parse::<SentimentLabel>()
            .map_err(|_| Error::Classification(format!("Unrecognised sentiment '{}'", label)));
    }

    let word = response
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric());

    word.parse::<SentimentLabel>().map_err(|_| {
        Error::Classification(format!("Ambiguous sentiment answer '{}'", response.trim()))
    })
}

#[derive(Deserialize)]
struct RawDiagnosis {
    #[serde(rename = "issueType", alias = "issue_type")]
    issue_type: String,
    tone: String,
    urgency: String,
}

/// Decomposes a diagnosis answer into its three fields. Partial answers are
/// rejected rather than filled with defaults.
pub fn parse_diagnosis(response: &str) -> Result<Diagnosis> {
    let json_str = extract_json(response)?;

    let raw: RawDiagnosis = serde_json::from_str(&json_str)
        .map_err(|e| Error::ParseError(format!("Failed to parse diagnosis: {}", e)))?;

    Diagnosis::from_parts(&raw.issue_type, &raw.tone, &raw.urgency)
}

fn extract_json(text: &str) -> Result<String> {
    // Try to find JSON block in markdown code blocks
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Ok(text[start..start + end].trim().to_string());
        }
    }

    // Try plain code block
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip any language identifier on the same line
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            let content = text[start..start + end].trim();
            if content.starts_with('{') {
                return Ok(content.to_string());
            }
        }
    }

    // Try to find raw JSON object
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Ok(text[start..end].to_string());
        }
    }

    Err(Error::ParseError("No valid JSON found in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Urgency;

    #[test]
    fn test_extract_json_from_markdown() {
        let input = r#"Here's the diagnosis:
```json
{"tone": "sad"}
```
"#;
        let result = extract_json(input).unwrap();
        assert_eq!(result, r#"{"tone": "sad"}"#);
    }

    #[test]
    fn test_extract_raw_json_after_multibyte_text() {
        let input = r#"Résumé — {"sentiment": "négative?"} trailing"#;
        let result = extract_json(input).unwrap();
        assert_eq!(result, r#"{"sentiment": "négative?"}"#);
    }

    #[test]
    fn test_parse_sentiment_json_and_bare_word() {
        assert_eq!(
            parse_sentiment(r#"{"sentiment": "Positive"}"#).unwrap(),
            SentimentLabel::Positive
        );
        assert_eq!(
            parse_sentiment("```json\n{\"label\": \"negative\"}\n```").unwrap(),
            SentimentLabel::Negative
        );
        assert_eq!(parse_sentiment("  NEGATIVE.\n").unwrap(), SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_sentiment_ambiguous() {
        for answer in [
            "mixed",
            "It is somewhat positive but also negative",
            r#"{"sentiment": "neutral"}"#,
            r#"{"score": 0.3}"#,
            "",
        ] {
            assert!(
                matches!(parse_sentiment(answer), Err(Error::Classification(_))),
                "expected classification error for {:?}",
                answer
            );
        }
    }

    #[test]
    fn test_parse_diagnosis() {
        let diagnosis = parse_diagnosis(
            r#"{"issueType": "Bug", "tone": "angry", "urgency": "High"}"#,
        )
        .unwrap();
        assert_eq!(diagnosis.issue_type(), "Bug");
        assert_eq!(diagnosis.tone(), "angry");
        assert_eq!(diagnosis.urgency(), Urgency::High);

        let snake = parse_diagnosis(
            r#"Sure: {"issue_type": "damaged product", "tone": "frustrated", "urgency": "medium"}"#,
        )
        .unwrap();
        assert_eq!(snake.issue_type(), "damaged product");
        assert_eq!(snake.urgency(), Urgency::Medium);
    }

    #[test]
    fn test_parse_diagnosis_partial_is_error() {
        let partial = parse_diagnosis(r#"{"issueType": "UX", "tone": "sad"}"#);
        assert!(matches!(partial, Err(Error::ParseError(_))));

        let blank = parse_diagnosis(r#"{"issueType": " ", "tone": "sad", "urgency": "low"}"#);
        assert!(matches!(blank, Err(Error::ParseError(_))));

        let bad_urgency =
            parse_diagnosis(r#"{"issueType": "UX", "tone": "sad", "urgency": "whenever"}"#);
        assert!(matches!(bad_urgency, Err(Error::ParseError(_))));

        assert!(matches!(parse_diagnosis("no json here"), Err(Error::ParseError(_))));
    }
}
