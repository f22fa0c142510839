#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod engine;
pub mod render;
pub mod scoring;
pub mod spec;
pub mod validate;

pub use answers::{AnswerSet, AnswerValue, Answers, BinaryToken, InputError, normalize_numeric};
pub use answers_schema::generate as answers_schema;
pub use engine::{Advance, EngineError, StepMark, SubmissionState, SubmissionTicket, WizardEngine};
pub use render::{WizardView, render_json_ui, render_text};
pub use scoring::{
    HttpScorer, PredictionResult, ScoreResponse, Scorer, ScorerConfig, ScoringError,
    USER_FACING_FAILURE,
};
pub use spec::{Bounds, CatalogError, ChoiceOption, QuestionKind, QuestionSpec, Questionnaire};
pub use validate::{ValidationError, ValidationReport, validate_all, validate_step};
