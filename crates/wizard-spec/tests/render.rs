mod common;

use common::{RecordingScorer, engine_with, fill_to_last, high_risk};
use wizard_spec::render::{NEXT_LABEL, SUBMIT_LABEL};
use wizard_spec::{WizardView, render_json_ui, render_text};

#[tokio::test]
async fn text_shows_prompt_hint_and_progress() {
    let engine = engine_with(RecordingScorer::new(high_risk));
    let view = WizardView::from_engine(&engine);

    let text = render_text(&view);
    assert!(text.contains("Step 1 of 3 [>..]"));
    assert!(text.contains("What is your heart rate?"));
    assert!(text.contains("Enter a value from 0 to 1"));
    assert_eq!(view.next_label, NEXT_LABEL);
    assert!(!view.can_retreat);
}

#[tokio::test]
async fn text_shows_validation_error() {
    let mut engine = engine_with(RecordingScorer::new(high_risk));
    engine.set_answer("7").expect("stored");
    engine.advance().await.unwrap_err();

    let text = render_text(&WizardView::from_engine(&engine));
    assert!(text.contains("Error: value must be between 0 and 1"));
    assert!(text.contains("Current value: 7"));
}

#[tokio::test]
async fn scale_defaults_to_its_minimum_for_display() {
    let mut engine = engine_with(RecordingScorer::new(high_risk));
    engine.set_answer("0.5").expect("stored");
    engine.advance().await.expect("advance");
    engine.set_answer("1").expect("stored");
    engine.advance().await.expect("advance");

    let view = WizardView::from_engine(&engine);
    assert_eq!(view.current_value, None);
    assert_eq!(view.displayed_value().as_deref(), Some("0"));
    assert_eq!(view.next_label, SUBMIT_LABEL);

    let ui = render_json_ui(&view);
    assert_eq!(ui["question"]["type"], "scale");
    assert_eq!(ui["question"]["help"], "Hours of sleep");
    assert_eq!(ui["progress"]["marks"][0], "done");
    assert_eq!(ui["progress"]["marks"][2], "active");
    assert_eq!(ui["can_retreat"], true);
}

#[tokio::test]
async fn result_is_rendered_with_three_digits() {
    let mut engine = engine_with(RecordingScorer::new(high_risk));
    fill_to_last(&mut engine).await;
    engine.advance().await.expect("submit");

    let view = WizardView::from_engine(&engine);
    let text = render_text(&view);
    assert!(text.contains("Result: High risk"));
    assert!(text.contains("Heart attack probability: 0.812"));

    let ui = render_json_ui(&view);
    assert_eq!(ui["status"], "succeeded");
    assert_eq!(ui["result"]["risk"], true);
    assert_eq!(ui["result"]["confidence_display"], "0.812");
    assert_eq!(ui["submission"]["status"], "succeeded");
}

#[tokio::test]
async fn choice_value_is_shown_by_label() {
    let mut engine = engine_with(RecordingScorer::new(high_risk));
    engine.set_answer("0.5").expect("stored");
    engine.advance().await.expect("advance");
    engine.set_answer("1").expect("stored");

    let view = WizardView::from_engine(&engine);
    assert!(render_text(&view).contains("Current value: Male"));
    let ui = render_json_ui(&view);
    assert_eq!(ui["question"]["options"][1]["value"], "0");
    assert_eq!(ui["question"]["current_value"], "1");
}
