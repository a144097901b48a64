pub mod classifier;
pub mod diagnoser;
pub mod responder;
pub mod pipeline;

pub use classifier::{AmbiguityPolicy, SentimentClassifier};
pub use diagnoser::IssueDiagnoser;
pub use responder::ResponseGenerator;
pub use pipeline::{ReviewPipeline, Step, WorkflowState};
