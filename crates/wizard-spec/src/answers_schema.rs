use serde_json::{Map, Value, json};

use crate::spec::question::{QuestionKind, QuestionSpec};
use crate::spec::questionnaire::Questionnaire;

/// JSON Schema of the request body the scorer receives.
pub fn generate(questionnaire: &Questionnaire) -> Value {
    let properties = questionnaire
        .questions
        .iter()
        .map(|question| (question.key.clone(), property_schema(question)))
        .collect::<Map<_, _>>();
    let required = questionnaire
        .keys()
        .map(|key| Value::String(key.to_string()))
        .collect::<Vec<_>>();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": questionnaire.title,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn property_schema(question: &QuestionSpec) -> Value {
    let mut schema = Map::new();
    schema.insert("description".into(), Value::String(question.prompt.clone()));
    match question.kind {
        QuestionKind::Numeric => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("pattern".into(), Value::String(r"^\d*\.?\d*$".into()));
        }
        QuestionKind::Boolean | QuestionKind::Choice => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert(
                "enum".into(),
                Value::Array(
                    question
                        .options
                        .iter()
                        .map(|option| Value::String(option.token.as_str().into()))
                        .collect(),
                ),
            );
        }
        QuestionKind::Scale => {
            schema.insert("type".into(), Value::String("integer".into()));
            if let Some(bounds) = question.bounds {
                schema.insert("minimum".into(), json!(bounds.min));
                schema.insert("maximum".into(), json!(bounds.max));
            }
        }
    }
    Value::Object(schema)
}
