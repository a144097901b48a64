use crate::error::Result;
use crate::llm::parser::parse_diagnosis;
use crate::llm::prompts::{diagnosis_prompt, DIAGNOSIS_SYSTEM_PROMPT};
use crate::llm::{CompletionRequest, ModelHandle};
use crate::models::{Diagnosis, ReviewInput};

pub struct IssueDiagnoser {
    model: ModelHandle,
}

impl IssueDiagnoser {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    pub async fn diagnose(&self, review: &ReviewInput) -> Result<Diagnosis> {
        let request = CompletionRequest::json(DIAGNOSIS_SYSTEM_PROMPT, diagnosis_prompt(review));
        let answer = self.model.complete(request).await?;
        parse_diagnosis(&answer)
    }
}
