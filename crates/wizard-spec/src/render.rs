use serde_json::{Map, Value, json};

use crate::engine::{StepMark, SubmissionState, WizardEngine};
use crate::scoring::PredictionResult;
use crate::spec::question::{QuestionKind, QuestionSpec};

pub const NEXT_LABEL: &str = "Next";
pub const SUBMIT_LABEL: &str = "Get prediction";

/// Snapshot of everything a view may show for the current session.
#[derive(Debug, Clone)]
pub struct WizardView {
    pub form_id: String,
    pub form_title: String,
    pub help: Option<String>,
    /// Zero-based position.
    pub step: usize,
    pub total: usize,
    pub progress_fraction: f64,
    pub question: QuestionSpec,
    pub current_value: Option<String>,
    pub error: Option<String>,
    pub submission: SubmissionState,
    pub can_retreat: bool,
    pub next_label: &'static str,
    pub marks: Vec<StepMark>,
}

impl WizardView {
    pub fn from_engine(engine: &WizardEngine) -> Self {
        let questionnaire = engine.questionnaire();
        let question = engine.current_question().clone();
        let current_value = engine.current_answer().map(|value| value.as_text());
        Self {
            form_id: questionnaire.id.clone(),
            form_title: questionnaire.title.clone(),
            help: questionnaire.description.clone(),
            step: engine.position(),
            total: engine.len(),
            progress_fraction: engine.progress_fraction(),
            question,
            current_value,
            error: engine.validation_error().map(str::to_string),
            submission: engine.submission().clone(),
            can_retreat: engine.can_retreat(),
            next_label: if engine.is_final_step() {
                SUBMIT_LABEL
            } else {
                NEXT_LABEL
            },
            marks: engine.step_marks(),
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.submission {
            SubmissionState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    /// Value a scale input shows before the user touches it.
    pub fn displayed_value(&self) -> Option<String> {
        self.current_value.clone().or_else(|| {
            match (self.question.kind, self.question.bounds) {
                (QuestionKind::Scale, Some(bounds)) => Some(format_bound(bounds.min)),
                _ => None,
            }
        })
    }
}

/// Render the view as human-friendly text.
pub fn render_text(view: &WizardView) -> String {
    let mut lines = Vec::new();

    match &view.submission {
        SubmissionState::Succeeded { result } => {
            lines.push(format!("Result: {}", result.verdict()));
            lines.push(result.summary().to_string());
            lines.push(format!(
                "Heart attack probability: {}",
                result.confidence_display()
            ));
            return lines.join("\n");
        }
        SubmissionState::InFlight => {
            lines.push("Scoring your answers...".to_string());
            return lines.join("\n");
        }
        SubmissionState::Failed { message } => lines.push(format!("Error: {}", message)),
        SubmissionState::Idle => {}
    }

    lines.push(format!(
        "Step {} of {} [{}]",
        view.step + 1,
        view.total,
        progress_strip(&view.marks)
    ));
    lines.push(view.question.prompt.clone());
    if let Some(hint) = input_hint(&view.question) {
        lines.push(format!("  {}", hint));
    }
    if let Some(help) = &view.question.help {
        lines.push(format!("  {}", help));
    }
    if let Some(value) = view.displayed_value() {
        lines.push(format!("  Current value: {}", display_value(&view.question, &value)));
    }
    if let Some(error) = &view.error {
        lines.push(format!("  Error: {}", error));
    }

    lines.join("\n")
}

/// Render the view as a structured JSON-friendly value.
pub fn render_json_ui(view: &WizardView) -> Value {
    let mut question = Map::new();
    question.insert("key".into(), Value::String(view.question.key.clone()));
    question.insert("prompt".into(), Value::String(view.question.prompt.clone()));
    question.insert(
        "type".into(),
        Value::String(view.question.kind.as_str().to_string()),
    );
    if let Some(bounds) = view.question.bounds {
        question.insert("min".into(), json!(bounds.min));
        question.insert("max".into(), json!(bounds.max));
    }
    if !view.question.options.is_empty() {
        question.insert(
            "options".into(),
            Value::Array(
                view.question
                    .options
                    .iter()
                    .map(|option| json!({ "label": option.label, "value": option.token.as_str() }))
                    .collect(),
            ),
        );
    }
    if let Some(help) = &view.question.help {
        question.insert("help".into(), Value::String(help.clone()));
    }
    if let Some(value) = view.displayed_value() {
        question.insert("current_value".into(), Value::String(value));
    }

    let result = view.result().map(|result| {
        json!({
            "risk": result.risk_flag,
            "verdict": result.verdict(),
            "confidence": result.confidence,
            "confidence_display": result.confidence_display(),
        })
    });

    json!({
        "form_id": view.form_id,
        "form_title": view.form_title,
        "help": view.help,
        "status": view.submission.as_str(),
        "progress": {
            "step": view.step + 1,
            "total": view.total,
            "fraction": view.progress_fraction,
            "marks": view.marks,
        },
        "question": Value::Object(question),
        "error": view.error,
        "can_retreat": view.can_retreat,
        "next_label": view.next_label,
        "submission": view.submission,
        "result": result,
    })
}

fn input_hint(question: &QuestionSpec) -> Option<String> {
    match question.kind {
        QuestionKind::Numeric => question.bounds.map(|bounds| {
            format!(
                "Enter a value from {} to {}",
                format_bound(bounds.min),
                format_bound(bounds.max)
            )
        }),
        QuestionKind::Scale => question.bounds.map(|bounds| {
            format!(
                "Pick a whole number from {} to {}",
                format_bound(bounds.min),
                format_bound(bounds.max)
            )
        }),
        QuestionKind::Boolean | QuestionKind::Choice => Some(format!(
            "Choose one of: {}",
            question
                .options
                .iter()
                .map(|option| format!("{} ({})", option.label, option.token.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn display_value(question: &QuestionSpec, value: &str) -> String {
    if question.kind.is_binary()
        && let Some(option) = question
            .options
            .iter()
            .find(|option| option.token.as_str() == value)
    {
        return option.label.clone();
    }
    value.to_string()
}

fn progress_strip(marks: &[StepMark]) -> String {
    marks
        .iter()
        .map(|mark| match mark {
            StepMark::Done => '#',
            StepMark::Active => '>',
            StepMark::Pending => '.',
        })
        .collect()
}

fn format_bound(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_strip_marks_each_step() {
        let marks = [StepMark::Done, StepMark::Active, StepMark::Pending];
        assert_eq!(progress_strip(&marks), "#>.");
    }

    #[test]
    fn hints_mention_bounds_and_options() {
        let numeric = QuestionSpec::numeric("bmi", "BMI", 0.0, 1.0);
        assert_eq!(
            input_hint(&numeric).as_deref(),
            Some("Enter a value from 0 to 1")
        );
        let choice = QuestionSpec::choice("gender", "Gender", "Male", "Female");
        assert_eq!(
            input_hint(&choice).as_deref(),
            Some("Choose one of: Male (1), Female (0)")
        );
    }
}
