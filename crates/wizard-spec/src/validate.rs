use serde::Serialize;
use thiserror::Error;

use crate::answers::{AnswerValue, Answers};
use crate::spec::question::QuestionSpec;
use crate::spec::questionnaire::Questionnaire;

/// Reasons a step cannot be left.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("value required")]
    MissingAnswer { key: String },
    #[error("value must be between {min} and {max}")]
    OutOfRange { key: String, min: f64, max: f64 },
}

impl ValidationError {
    pub fn key(&self) -> &str {
        match self {
            ValidationError::MissingAnswer { key } | ValidationError::OutOfRange { key, .. } => key,
        }
    }
}

/// Checks the answer stored for one question.
///
/// Numeric and scale fields are range checked. Interactive scale input is
/// clamped on entry, but values restored from a file are not.
pub fn validate_step(
    question: &QuestionSpec,
    answer: Option<&AnswerValue>,
) -> Result<(), ValidationError> {
    let answer = match answer {
        Some(answer) if !answer.is_empty() => answer,
        _ => {
            return Err(ValidationError::MissingAnswer {
                key: question.key.clone(),
            });
        }
    };

    if question.kind.is_bounded() {
        let (min, max) = question
            .bounds
            .map(|bounds| (bounds.min, bounds.max))
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        let in_range = answer
            .as_f64()
            .is_some_and(|value| value >= min && value <= max);
        if !in_range {
            return Err(ValidationError::OutOfRange {
                key: question.key.clone(),
                min,
                max,
            });
        }
    }

    Ok(())
}

/// Whole-record validation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing: Vec<String>,
    pub unknown: Vec<String>,
}

/// Validates a complete answer record, as it would be submitted to the scorer.
pub fn validate_all(questionnaire: &Questionnaire, answers: &Answers) -> ValidationReport {
    let mut errors = Vec::new();
    let mut missing = Vec::new();

    for question in &questionnaire.questions {
        match validate_step(question, answers.get(&question.key)) {
            Ok(()) => {}
            Err(ValidationError::MissingAnswer { key }) => missing.push(key),
            Err(error) => errors.push(error),
        }
    }

    let unknown = answers
        .keys()
        .filter(|key| questionnaire.question(key).is_none())
        .map(str::to_string)
        .collect::<Vec<_>>();

    ValidationReport {
        valid: errors.is_empty() && missing.is_empty() && unknown.is_empty(),
        errors,
        missing,
        unknown,
    }
}
