//! Server-rendered HTML for the review form.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::Result;
use crate::models::ResponseRecord;

const PAGE: &str = "review_page";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 24px; color: #222; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 32px; }
textarea { width: 100%; height: 150px; font: inherit; padding: 8px; box-sizing: border-box; }
button { padding: 8px 16px; margin-top: 8px; }
.sentiment-positive { background-color: #d4edda; padding: 15px; border-radius: 8px; border-left: 4px solid #28a745; }
.sentiment-negative { background-color: #f8d7da; padding: 15px; border-radius: 8px; border-left: 4px solid #dc3545; }
.diagnosis-box { background-color: #e7f3ff; padding: 15px; border-radius: 8px; border-left: 4px solid #0066cc; }
.response-box { background-color: #f0f8ff; padding: 15px; border-radius: 8px; border-left: 4px solid #4169e1; }
.metrics { display: flex; gap: 24px; margin: 12px 0; }
.metric span { display: block; font-size: 12px; color: #666; }
.metric strong { font-size: 20px; }
.notice { background: #fff3cd; padding: 12px; border-radius: 8px; }
.error { background: #f8d7da; padding: 12px; border-radius: 8px; }
.reply { white-space: pre-wrap; }
footer { text-align: center; color: #666; font-size: 12px; margin-top: 32px; }
"#;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Review Response Assistant</title>
<style>{{{style}}}</style>
</head>
<body>
<h1>Review Response Assistant</h1>
<p>Analyzes customer reviews and generates appropriate responses. Model: {{model}}</p>
<div class="columns">
<section>
<h3>Input Review</h3>
<form method="post" action="/">
<textarea name="review" placeholder="Type or paste a customer review here...">{{review}}</textarea>
<button type="submit">Analyze Review</button>
<a href="/">Clear</a>
</form>
</section>
<section>
<h3>Analysis Results</h3>
{{#if notice}}<div class="notice">{{notice}}</div>{{/if}}
{{#if failure}}<div class="error">Error processing review: {{failure}}</div>{{/if}}
{{#with result}}
<div class="sentiment-{{sentiment}}"><h4>Sentiment: <strong>{{sentiment_label}}</strong></h4></div>
{{#if metrics}}
<div class="diagnosis-box"><h4>Issue Diagnosis</h4></div>
<div class="metrics">{{#each metrics}}<div class="metric"><span>{{label}}</span><strong>{{value}}</strong></div>{{/each}}</div>
{{/if}}
<div class="response-box"><h4>Generated Response</h4></div>
<p class="reply">{{response}}</p>
{{/with}}
</section>
</div>
<footer>Positive reviews get warm thanks; negative reviews are diagnosed and answered sympathetically.</footer>
</body>
</html>
"#;

const EMPTY_NOTICE: &str = "Enter a review and click 'Analyze Review' to get started";

/// What the results column shows.
pub enum Outcome<'a> {
    Empty,
    Warning(&'a str),
    Failure(&'a str),
    Success(&'a ResponseRecord),
}

#[derive(Serialize)]
struct PageData<'a> {
    style: &'static str,
    model: &'a str,
    review: &'a str,
    notice: Option<&'a str>,
    failure: Option<&'a str>,
    result: Option<RecordView<'a>>,
}

#[derive(Serialize)]
struct RecordView<'a> {
    sentiment: &'static str,
    sentiment_label: String,
    metrics: Vec<Metric>,
    response: &'a str,
}

#[derive(Serialize)]
struct Metric {
    label: &'static str,
    value: String,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a ResponseRecord) -> Self {
        let sentiment = record.sentiment().as_str();
        let metrics = record
            .diagnosis()
            .map(|diagnosis| {
                vec![
                    Metric {
                        label: "Issue Type",
                        value: diagnosis.issue_type().to_string(),
                    },
                    Metric {
                        label: "Tone",
                        value: title_case(diagnosis.tone()),
                    },
                    Metric {
                        label: "Urgency",
                        value: title_case(&diagnosis.urgency().to_string()),
                    },
                ]
            })
            .unwrap_or_default();

        Self {
            sentiment,
            sentiment_label: sentiment.to_uppercase(),
            metrics,
            response: record.response(),
        }
    }
}

/// Handlebars registry holding the review page. Values are HTML-escaped on render.
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string(PAGE, PAGE_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, review: &str, outcome: Outcome<'_>, model: &str) -> Result<String> {
        let mut data = PageData {
            style: STYLE,
            model,
            review,
            notice: None,
            failure: None,
            result: None,
        };

        match outcome {
            Outcome::Empty => data.notice = Some(EMPTY_NOTICE),
            Outcome::Warning(message) => data.notice = Some(message),
            Outcome::Failure(message) => data.failure = Some(message),
            Outcome::Success(record) => data.result = Some(RecordView::new(record)),
        }

        Ok(self.handlebars.render(PAGE, &data)?)
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnosis, Urgency};

    fn renderer() -> PageRenderer {
        PageRenderer::new().unwrap()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("very ANGRY"), "Very Angry");
        assert_eq!(title_case("high"), "High");
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = renderer()
            .render("<script>alert(1)</script>", Outcome::Empty, "m")
            .unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("to get started"));
    }

    #[test]
    fn test_negative_record_shows_diagnosis_metrics() {
        let record = ResponseRecord::negative(
            Diagnosis::new("Bug", "angry", Urgency::High),
            "We are <sorry>.".to_string(),
            "m",
        );
        let html = renderer()
            .render("It broke", Outcome::Success(&record), "m")
            .unwrap();
        assert!(html.contains("sentiment-negative"));
        assert!(html.contains("NEGATIVE"));
        assert!(html.contains("Issue Diagnosis"));
        assert!(html.contains("<strong>Angry</strong>"));
        assert!(html.contains("<strong>High</strong>"));
        assert!(html.contains("We are &lt;sorry&gt;."));
    }

    #[test]
    fn test_positive_record_has_no_diagnosis_box() {
        let record = ResponseRecord::positive("Thanks!".to_string(), "m");
        let html = renderer()
            .render("Great", Outcome::Success(&record), "m")
            .unwrap();
        assert!(html.contains("sentiment-positive"));
        assert!(html.contains("Thanks!"));
        assert!(!html.contains("Issue Diagnosis"));
        assert!(!html.contains("to get started"));
    }

    #[test]
    fn test_failure_banner() {
        let html = renderer()
            .render("Meh", Outcome::Failure("Model API error: 503"), "m")
            .unwrap();
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("Error processing review: Model API error: 503"));
        assert!(!html.contains("Generated Response"));
    }
}
