use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::spec::question::{QuestionKind, QuestionSpec};
use crate::spec::questionnaire::Questionnaire;

static PARTIAL_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d*$").expect("partial decimal pattern compiles"));

/// One of the two fixed tokens used by boolean and choice questions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum BinaryToken {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
}

impl BinaryToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryToken::Zero => "0",
            BinaryToken::One => "1",
        }
    }

    pub fn from_token(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" => Some(BinaryToken::Zero),
            "1" => Some(BinaryToken::One),
            _ => None,
        }
    }
}

/// Input that cannot be stored for the current question.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{input}' is not a decimal number")]
    NotDecimal { input: String },
    #[error("'{input}' is not one of: {expected}")]
    UnknownOption { input: String, expected: String },
    #[error("'{input}' is not a number")]
    NotNumber { input: String },
    #[error("'{input}' is not a whole number")]
    NotWhole { input: String },
}

/// A stored answer. Serializes to the scorer's wire representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Token(BinaryToken),
    NumericText(String),
    ScaleNumber(i64),
}

/// Shapes a saved answer may take in a JSON file.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAnswer {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<StoredAnswer> for AnswerValue {
    fn from(stored: StoredAnswer) -> Self {
        match stored {
            StoredAnswer::Text(text) => match BinaryToken::from_token(&text) {
                Some(token) if text.len() == 1 => AnswerValue::Token(token),
                _ => AnswerValue::NumericText(text),
            },
            StoredAnswer::Integer(number) => AnswerValue::ScaleNumber(number),
            StoredAnswer::Float(number) => AnswerValue::NumericText(number.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StoredAnswer::deserialize(deserializer).map(AnswerValue::from)
    }
}

impl AnswerValue {
    /// Coerces raw user input into a value for `question`.
    ///
    /// Numeric input goes through [`normalize_numeric`], so partially typed
    /// decimals such as `"0."` are accepted and only checked on advance.
    pub fn coerce(question: &QuestionSpec, raw: &str) -> Result<Self, InputError> {
        match question.kind {
            QuestionKind::Numeric => normalize_numeric(raw)
                .map(AnswerValue::NumericText)
                .ok_or_else(|| InputError::NotDecimal { input: raw.into() }),
            QuestionKind::Boolean | QuestionKind::Choice => BinaryToken::from_token(raw)
                .or_else(|| question.option_by_label(raw).map(|option| option.token))
                .map(AnswerValue::Token)
                .ok_or_else(|| InputError::UnknownOption {
                    input: raw.into(),
                    expected: question
                        .options
                        .iter()
                        .map(|option| format!("{} ({})", option.label, option.token.as_str()))
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            QuestionKind::Scale => {
                let parsed = parse_scale(raw)?;
                let clamped = question
                    .bounds
                    .and_then(|bounds| bounds.clamp_whole(parsed))
                    .unwrap_or_else(|| parsed.round());
                Ok(AnswerValue::ScaleNumber(clamped as i64))
            }
        }
    }

    /// Re-reads a saved value for `question`.
    ///
    /// Unlike [`AnswerValue::coerce`], scale values are neither rounded nor
    /// clamped: a stored value outside the bounds is left for validation to
    /// report.
    pub fn restore(question: &QuestionSpec, stored: &AnswerValue) -> Result<Self, InputError> {
        if question.kind != QuestionKind::Scale {
            return Self::coerce(question, &stored.as_text());
        }
        if let AnswerValue::ScaleNumber(number) = stored {
            return Ok(AnswerValue::ScaleNumber(*number));
        }
        let text = stored.as_text();
        let parsed = parse_scale(&text)?;
        if parsed.fract() != 0.0 || parsed.abs() > i64::MAX as f64 {
            return Err(InputError::NotWhole { input: text });
        }
        Ok(AnswerValue::ScaleNumber(parsed as i64))
    }

    /// True when nothing usable has been entered yet.
    pub fn is_empty(&self) -> bool {
        matches!(self, AnswerValue::NumericText(text) if text.is_empty())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnswerValue::NumericText(text) => text.parse::<f64>().ok(),
            AnswerValue::ScaleNumber(number) => Some(*number as f64),
            AnswerValue::Token(_) => None,
        }
    }

    /// Textual form, as a user would have typed it.
    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::NumericText(text) => text.clone(),
            AnswerValue::Token(token) => token.as_str().into(),
            AnswerValue::ScaleNumber(number) => number.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::NumericText(text) => Value::String(text.clone()),
            AnswerValue::Token(token) => Value::String(token.as_str().into()),
            AnswerValue::ScaleNumber(number) => Value::from(*number),
        }
    }

    /// Human-friendly rendering, using option labels for binary questions.
    pub fn display(&self, question: &QuestionSpec) -> String {
        match self {
            AnswerValue::NumericText(text) => text.clone(),
            AnswerValue::ScaleNumber(number) => number.to_string(),
            AnswerValue::Token(token) => question
                .option_for(*token)
                .map(|option| option.label.clone())
                .unwrap_or_else(|| token.as_str().into()),
        }
    }
}

fn parse_scale(raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::NotNumber { input: raw.into() })
}

/// Converts a comma decimal separator to a period and accepts the result only
/// if it is a (possibly partial) decimal literal.
///
/// Returns `None` when the input must be rejected.
pub fn normalize_numeric(text: &str) -> Option<String> {
    if text.is_empty() {
        return Some(String::new());
    }
    let formatted = text.replace(',', ".");
    if PARTIAL_DECIMAL.is_match(&formatted) {
        Some(formatted)
    } else {
        None
    }
}

/// Answers keyed by question key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, AnswerValue>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Re-reads every known key against its question kind.
    ///
    /// Decoding a file cannot tell `"1"` typed into a numeric field from the
    /// boolean token, so answers loaded from a file go through this before use.
    /// Keys without a matching question are kept as they are.
    pub fn conformed_to(
        &self,
        questionnaire: &Questionnaire,
    ) -> Result<Self, (String, InputError)> {
        let mut conformed = Answers::new();
        for (key, value) in &self.0 {
            let value = match questionnaire.question(key) {
                Some(question) => {
                    AnswerValue::restore(question, value).map_err(|error| (key.clone(), error))?
                }
                None => value.clone(),
            };
            conformed.insert(key.clone(), value);
        }
        Ok(conformed)
    }

    /// JSON object sent to the scorer. Values are passed through verbatim.
    pub fn to_request_body(&self) -> Value {
        let map = self
            .0
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}

/// Exportable snapshot of a completed (or partial) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub form_id: String,
    pub spec_version: String,
    pub answers: Answers,
}

impl AnswerSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}
