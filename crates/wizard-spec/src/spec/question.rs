use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::BinaryToken;

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free-form decimal typed as text.
    Numeric,
    /// Yes/no answered with the `"1"`/`"0"` tokens.
    Boolean,
    /// Integer picked from a clamped range input.
    Scale,
    /// Two labeled options mapped onto the `"1"`/`"0"` tokens.
    Choice,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Numeric => "numeric",
            QuestionKind::Boolean => "boolean",
            QuestionKind::Scale => "scale",
            QuestionKind::Choice => "choice",
        }
    }

    /// Kinds that carry numeric bounds.
    pub fn is_bounded(&self) -> bool {
        matches!(self, QuestionKind::Numeric | QuestionKind::Scale)
    }

    /// Kinds answered with one of two fixed tokens.
    pub fn is_binary(&self) -> bool {
        matches!(self, QuestionKind::Boolean | QuestionKind::Choice)
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Smallest and largest whole numbers inside the range, if any.
    pub fn whole_span(&self) -> Option<(f64, f64)> {
        let (low, high) = (self.min.ceil(), self.max.floor());
        (low <= high).then_some((low, high))
    }

    /// Rounds `value` to the nearest whole number the range still contains.
    pub fn clamp_whole(&self, value: f64) -> Option<f64> {
        self.whole_span()
            .map(|(low, high)| value.round().max(low).min(high))
    }
}

/// A labeled option for binary questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub label: String,
    pub token: BinaryToken,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, token: BinaryToken) -> Self {
        Self {
            label: label.into(),
            token,
        }
    }
}

/// Static description of a single wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    /// Field name submitted to the scorer.
    pub key: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl QuestionSpec {
    pub fn numeric(key: &str, prompt: &str, min: f64, max: f64) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind: QuestionKind::Numeric,
            bounds: Some(Bounds::new(min, max)),
            options: Vec::new(),
            help: None,
        }
    }

    pub fn scale(key: &str, prompt: &str, min: f64, max: f64) -> Self {
        Self {
            kind: QuestionKind::Scale,
            ..Self::numeric(key, prompt, min, max)
        }
    }

    pub fn boolean(key: &str, prompt: &str) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind: QuestionKind::Boolean,
            bounds: None,
            options: vec![
                ChoiceOption::new("Yes", BinaryToken::One),
                ChoiceOption::new("No", BinaryToken::Zero),
            ],
            help: None,
        }
    }

    pub fn choice(key: &str, prompt: &str, one: &str, zero: &str) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind: QuestionKind::Choice,
            bounds: None,
            options: vec![
                ChoiceOption::new(one, BinaryToken::One),
                ChoiceOption::new(zero, BinaryToken::Zero),
            ],
            help: None,
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Finds the option whose label matches `label`, ignoring case.
    pub fn option_by_label(&self, label: &str) -> Option<&ChoiceOption> {
        self.options
            .iter()
            .find(|option| option.label.eq_ignore_ascii_case(label.trim()))
    }

    pub fn option_for(&self, token: BinaryToken) -> Option<&ChoiceOption> {
        self.options.iter().find(|option| option.token == token)
    }
}
