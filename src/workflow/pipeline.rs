use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::llm::{ModelGateway, ModelHandle};
use crate::models::{Diagnosis, ResponseRecord, ReviewInput, SentimentLabel};
use crate::workflow::classifier::{AmbiguityPolicy, SentimentClassifier};
use crate::workflow::diagnoser::IssueDiagnoser;
use crate::workflow::responder::ResponseGenerator;

/// Where a single review invocation currently stands.
///
/// `Start -> SentimentChecked -> [Diagnosed] -> Responded`; diagnosis only
/// happens on the negative branch.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Start(ReviewInput),
    SentimentChecked {
        review: ReviewInput,
        sentiment: SentimentLabel,
    },
    Diagnosed {
        review: ReviewInput,
        diagnosis: Diagnosis,
    },
    Responded(ResponseRecord),
}

/// The external call needed to leave a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Classify,
    Diagnose,
    Respond,
    Finish,
}

impl WorkflowState {
    pub fn next_step(&self) -> Step {
        match self {
            WorkflowState::Start(_) => Step::Classify,
            WorkflowState::SentimentChecked {
                sentiment: SentimentLabel::Negative,
                ..
            } => Step::Diagnose,
            WorkflowState::SentimentChecked {
                sentiment: SentimentLabel::Positive,
                ..
            } => Step::Respond,
            WorkflowState::Diagnosed { .. } => Step::Respond,
            WorkflowState::Responded(_) => Step::Finish,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            WorkflowState::Start(_) => "start",
            WorkflowState::SentimentChecked { .. } => "sentiment_checked",
            WorkflowState::Diagnosed { .. } => "diagnosed",
            WorkflowState::Responded(_) => "responded",
        }
    }

    pub fn review(&self) -> Option<&ReviewInput> {
        match self {
            WorkflowState::Start(review)
            | WorkflowState::SentimentChecked { review, .. }
            | WorkflowState::Diagnosed { review, .. } => Some(review),
            WorkflowState::Responded(_) => None,
        }
    }

    pub fn classified(self, sentiment: SentimentLabel) -> Result<Self> {
        match self {
            WorkflowState::Start(review) => Ok(WorkflowState::SentimentChecked { review, sentiment }),
            other => Err(out_of_order(&other, Step::Classify)),
        }
    }

    pub fn diagnosed(self, diagnosis: Diagnosis) -> Result<Self> {
        match self {
            WorkflowState::SentimentChecked {
                review,
                sentiment: SentimentLabel::Negative,
            } => Ok(WorkflowState::Diagnosed { review, diagnosis }),
            other => Err(out_of_order(&other, Step::Diagnose)),
        }
    }

    pub fn responded(self, response: String, model: &str) -> Result<Self> {
        match self {
            WorkflowState::SentimentChecked {
                sentiment: SentimentLabel::Positive,
                ..
            } => Ok(WorkflowState::Responded(ResponseRecord::positive(response, model))),
            WorkflowState::Diagnosed { diagnosis, .. } => Ok(WorkflowState::Responded(
                ResponseRecord::negative(diagnosis, response, model),
            )),
            other => Err(out_of_order(&other, Step::Respond)),
        }
    }

    pub fn into_record(self) -> Result<ResponseRecord> {
        match self {
            WorkflowState::Responded(record) => Ok(record),
            other => Err(out_of_order(&other, Step::Finish)),
        }
    }

    fn response_context(&self) -> Option<(&ReviewInput, SentimentLabel, Option<&Diagnosis>)> {
        match self {
            WorkflowState::SentimentChecked { review, sentiment } => Some((review, *sentiment, None)),
            WorkflowState::Diagnosed { review, diagnosis } => {
                Some((review, SentimentLabel::Negative, Some(diagnosis)))
            }
            _ => None,
        }
    }
}

fn out_of_order(state: &WorkflowState, step: Step) -> Error {
    Error::InvalidInput(format!(
        "Workflow step {:?} cannot run from state '{}'",
        step,
        state.stage()
    ))
}

pub struct ReviewPipeline {
    classifier: SentimentClassifier,
    diagnoser: IssueDiagnoser,
    responder: ResponseGenerator,
    model_name: String,
}

impl ReviewPipeline {
    pub fn new(model: ModelHandle, policy: AmbiguityPolicy) -> Self {
        Self {
            model_name: model.model().to_string(),
            classifier: SentimentClassifier::new(model.clone(), policy),
            diagnoser: IssueDiagnoser::new(model.clone()),
            responder: ResponseGenerator::new(model),
        }
    }

    /// Builds a pipeline on the gateway's cached handle. Missing credentials
    /// surface here, before any review is processed.
    pub fn from_gateway(
        gateway: &ModelGateway,
        config: &ModelConfig,
        policy: AmbiguityPolicy,
    ) -> Result<Self> {
        let model = gateway.get_handle(config)?;
        Ok(Self::new(model, policy))
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn ambiguity_policy(&self) -> AmbiguityPolicy {
        self.classifier.policy()
    }

    pub async fn process_review(&self, text: &str) -> Result<ResponseRecord> {
        let review = ReviewInput::new(text)?;
        self.run(review).await
    }

    /// Drives one review from `Start` to `Responded`. Any failure aborts
    /// the run; no partial record is returned.
    pub async fn run(&self, review: ReviewInput) -> Result<ResponseRecord> {
        tracing::debug!("Processing review ({} chars)", review.char_count());
        let mut state = WorkflowState::Start(review);

        loop {
            let step = state.next_step();
            tracing::debug!("Workflow at '{}', next step {:?}", state.stage(), step);

            state = match step {
                Step::Classify => {
                    let sentiment = match state.review() {
                        Some(review) => self.classifier.classify(review).await?,
                        None => return Err(out_of_order(&state, step)),
                    };
                    state.classified(sentiment)?
                }
                Step::Diagnose => {
                    let diagnosis = match state.review() {
                        Some(review) => self.diagnoser.diagnose(review).await?,
                        None => return Err(out_of_order(&state, step)),
                    };
                    state.diagnosed(diagnosis)?
                }
                Step::Respond => {
                    let response = match state.response_context() {
                        Some((review, sentiment, diagnosis)) => {
                            self.responder.generate(review, sentiment, diagnosis).await?
                        }
                        None => return Err(out_of_order(&state, step)),
                    };
                    state.responded(response, &self.model_name)?
                }
                Step::Finish => {
                    let record = state.into_record()?;
                    tracing::info!(
                        "Review processed: sentiment={}, diagnosed={}",
                        record.sentiment().as_str(),
                        record.diagnosis().is_some()
                    );
                    return Ok(record);
                }
            };
        }
    }

    /// Processes independent reviews concurrently, at most
    /// `concurrency_limit` at a time. Results keep the input order.
    pub async fn process_batch<F>(
        &self,
        reviews: Vec<String>,
        concurrency_limit: usize,
        on_complete: F,
    ) -> Vec<Result<ResponseRecord>>
    where
        F: Fn() + Sync,
    {
        let semaphore = Semaphore::new(concurrency_limit.max(1));
        let semaphore = &semaphore;
        let on_complete = &on_complete;

        let futures = reviews.into_iter().map(|text| async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| Error::ExternalService(format!("Batch scheduler closed: {}", e)))?;
            let result = self.process_review(&text).await;
            on_complete();
            result
        });

        join_all(futures).await
    }
}
