use std::collections::BTreeSet;

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::question::{QuestionKind, QuestionSpec};

/// Structural problems in a questionnaire definition.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("questionnaire '{0}' has no questions")]
    Empty(String),
    #[error("question key '{0}' is used more than once")]
    DuplicateKey(String),
    #[error("question '{0}' needs bounds")]
    MissingBounds(String),
    #[error("question '{0}' has non-finite bounds")]
    NonFiniteBounds(String),
    #[error("question '{key}' has inverted bounds ({min} > {max})")]
    InvertedBounds { key: String, min: f64, max: f64 },
    #[error("scale question '{0}' has no whole number between its bounds")]
    NoWholeValue(String),
    #[error("question '{0}' must define exactly two options with distinct tokens")]
    BadOptions(String),
    #[error("failed to parse questionnaire: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered, immutable list of wizard steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Questionnaire {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionSpec>,
}

impl Questionnaire {
    /// Parses a questionnaire from JSON and runs [`Questionnaire::check`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let questionnaire: Questionnaire = serde_json::from_str(json)?;
        questionnaire.check()?;
        Ok(questionnaire)
    }

    /// JSON Schema describing questionnaire files accepted by [`Questionnaire::from_json`].
    pub fn json_schema() -> Value {
        schema_for!(Questionnaire).to_value()
    }

    pub fn check(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::Empty(self.id.clone()));
        }

        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.key.as_str()) {
                return Err(CatalogError::DuplicateKey(question.key.clone()));
            }

            if question.kind.is_bounded() {
                let bounds = question
                    .bounds
                    .ok_or_else(|| CatalogError::MissingBounds(question.key.clone()))?;
                if !bounds.is_finite() {
                    return Err(CatalogError::NonFiniteBounds(question.key.clone()));
                }
                if bounds.min > bounds.max {
                    return Err(CatalogError::InvertedBounds {
                        key: question.key.clone(),
                        min: bounds.min,
                        max: bounds.max,
                    });
                }
                if question.kind == QuestionKind::Scale && bounds.whole_span().is_none() {
                    return Err(CatalogError::NoWholeValue(question.key.clone()));
                }
            }

            if question.kind.is_binary() {
                let distinct = question
                    .options
                    .iter()
                    .map(|option| option.token)
                    .collect::<BTreeSet<_>>();
                if question.options.len() != 2 || distinct.len() != 2 {
                    return Err(CatalogError::BadOptions(question.key.clone()));
                }
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, key: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|question| question.key.as_str())
    }

    pub fn count_of(&self, kind: QuestionKind) -> usize {
        self.questions
            .iter()
            .filter(|question| question.kind == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::question::Bounds;
    use serde_json::json;

    fn single(question: serde_json::Value) -> String {
        json!({
            "id": "t",
            "title": "T",
            "version": "1",
            "questions": [question]
        })
        .to_string()
    }

    #[test]
    fn rejects_empty_catalog() {
        let raw = json!({ "id": "t", "title": "T", "version": "1", "questions": [] });
        let err = Questionnaire::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty(id) if id == "t"));
    }

    #[test]
    fn rejects_numeric_without_bounds() {
        let raw = single(json!({ "key": "bmi", "prompt": "BMI", "type": "numeric" }));
        let err = Questionnaire::from_json(&raw).unwrap_err();
        assert!(matches!(err, CatalogError::MissingBounds(key) if key == "bmi"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let raw = single(json!({
            "key": "bmi",
            "prompt": "BMI",
            "type": "numeric",
            "bounds": { "min": 2.0, "max": 1.0 }
        }));
        assert!(matches!(
            Questionnaire::from_json(&raw),
            Err(CatalogError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let mut questionnaire = Questionnaire::heart_risk();
        questionnaire.questions[0].bounds = Some(Bounds::new(f64::NAN, 1.0));
        assert!(matches!(
            questionnaire.check(),
            Err(CatalogError::NonFiniteBounds(key)) if key == "heart_rate"
        ));
    }

    #[test]
    fn rejects_scale_without_whole_values() {
        let raw = single(json!({
            "key": "stress_level",
            "prompt": "Stress",
            "type": "scale",
            "bounds": { "min": 0.2, "max": 0.8 }
        }));
        assert!(matches!(
            Questionnaire::from_json(&raw),
            Err(CatalogError::NoWholeValue(key)) if key == "stress_level"
        ));
    }

    #[test]
    fn rejects_boolean_with_one_option() {
        let raw = single(json!({
            "key": "diabetes",
            "prompt": "Diabetes?",
            "type": "boolean",
            "options": [{ "label": "Yes", "token": "1" }]
        }));
        assert!(matches!(
            Questionnaire::from_json(&raw),
            Err(CatalogError::BadOptions(key)) if key == "diabetes"
        ));
    }

    #[test]
    fn catalog_schema_describes_questions() {
        let schema = Questionnaire::json_schema();
        assert_eq!(schema["title"], "Questionnaire");
        let required = schema["required"].as_array().expect("required list");
        assert!(required.iter().any(|key| key == "questions"));
        assert!(schema["properties"]["questions"].is_object());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let raw = json!({
            "id": "t",
            "title": "T",
            "version": "1",
            "questions": [
                { "key": "a", "prompt": "A", "type": "scale", "bounds": { "min": 0, "max": 3 } },
                { "key": "a", "prompt": "A", "type": "scale", "bounds": { "min": 0, "max": 3 } }
            ]
        });
        assert!(matches!(
            Questionnaire::from_json(&raw.to_string()),
            Err(CatalogError::DuplicateKey(key)) if key == "a"
        ));
    }
}
