//! Built-in heart attack risk questionnaire.
//!
//! Keys and order match the feature set the scoring service expects. Numeric
//! features are collected already scaled to `[0, 1]`.

use crate::spec::question::QuestionSpec;
use crate::spec::questionnaire::Questionnaire;

pub const HEART_RISK_ID: &str = "heart-risk";

impl Questionnaire {
    pub fn heart_risk() -> Self {
        Self {
            id: HEART_RISK_ID.into(),
            title: "Heart attack risk assessment".into(),
            version: "1.0.0".into(),
            description: Some("Enter your data step by step to estimate the risk.".into()),
            questions: heart_risk_questions(),
        }
    }
}

fn heart_risk_questions() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::numeric("heart_rate", "What is your heart rate? (bpm)", 0.0, 1.0),
        QuestionSpec::boolean("diabetes", "Do you have diabetes?"),
        QuestionSpec::boolean("family_history", "Have your relatives had heart problems?"),
        QuestionSpec::boolean("obesity", "Do you suffer from obesity?"),
        QuestionSpec::boolean("alcohol_consumption", "Do you drink alcohol?"),
        QuestionSpec::numeric(
            "exercise_hours_per_week",
            "How many hours of exercise do you get per week?",
            0.0,
            1.0,
        ),
        QuestionSpec::boolean(
            "previous_heart_problems",
            "Have you had heart problems before?",
        ),
        QuestionSpec::boolean("medication_use", "Do you take medication?"),
        QuestionSpec::scale(
            "stress_level",
            "Rate your stress level from 1 to 10",
            1.0,
            10.0,
        )
        .with_help("Stress level"),
        QuestionSpec::numeric(
            "sedentary_hours_per_day",
            "How many hours a day do you spend sitting?",
            0.0,
            1.0,
        ),
        QuestionSpec::numeric("income", "Your monthly income", 0.0, 1.0),
        QuestionSpec::numeric("bmi", "Your BMI (body mass index)", 0.0, 1.0),
        QuestionSpec::numeric("triglycerides", "Your triglyceride level", 0.0, 1.0),
        QuestionSpec::scale(
            "physical_activity_days_per_week",
            "Number of days with physical activity per week",
            0.0,
            7.0,
        )
        .with_help("Days per week"),
        QuestionSpec::scale(
            "sleep_hours_per_day",
            "Number of hours of sleep per day",
            0.0,
            6.0,
        )
        .with_help("Hours of sleep"),
        QuestionSpec::choice("gender", "Your gender", "Male", "Female"),
        QuestionSpec::numeric(
            "systolic_blood_pressure",
            "Your systolic blood pressure",
            0.0,
            1.0,
        ),
        QuestionSpec::numeric(
            "diastolic_blood_pressure",
            "Your diastolic blood pressure",
            0.0,
            1.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::question::QuestionKind;

    #[test]
    fn builtin_catalog_is_well_formed() {
        let catalog = Questionnaire::heart_risk();
        catalog.check().expect("built-in catalog");
        assert_eq!(catalog.len(), 18);
        assert_eq!(catalog.count_of(QuestionKind::Numeric), 8);
        assert_eq!(catalog.count_of(QuestionKind::Boolean), 6);
        assert_eq!(catalog.count_of(QuestionKind::Scale), 3);
        assert_eq!(catalog.count_of(QuestionKind::Choice), 1);
    }

    #[test]
    fn builtin_catalog_keeps_scorer_order() {
        let catalog = Questionnaire::heart_risk();
        let keys = catalog.keys().collect::<Vec<_>>();
        assert_eq!(keys.first(), Some(&"heart_rate"));
        assert_eq!(keys[8], "stress_level");
        assert_eq!(keys[15], "gender");
        assert_eq!(keys.last(), Some(&"diastolic_blood_pressure"));
    }
}
