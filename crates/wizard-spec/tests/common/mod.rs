#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use wizard_spec::{Questionnaire, ScoreResponse, Scorer, ScoringError, WizardEngine};

pub fn fixture(name: &str) -> &'static str {
    match name {
        "short_form" => include_str!("../fixtures/short_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

pub fn short_form() -> Questionnaire {
    Questionnaire::from_json(fixture("short_form")).expect("fixture parses")
}

/// Scorer that replays a canned outcome and records every request body.
pub struct RecordingScorer {
    outcome: fn() -> Result<ScoreResponse, ScoringError>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
}

impl RecordingScorer {
    pub fn new(outcome: fn() -> Result<ScoreResponse, ScoringError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().expect("lock").last().cloned()
    }
}

#[async_trait]
impl Scorer for RecordingScorer {
    async fn score(&self, body: &Value) -> Result<ScoreResponse, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().expect("lock").push(body.clone());
        (self.outcome)()
    }
}

pub fn high_risk() -> Result<ScoreResponse, ScoringError> {
    Ok(ScoreResponse {
        prediction: 1,
        probability: 0.812345,
    })
}

pub fn unreachable() -> Result<ScoreResponse, ScoringError> {
    Err(ScoringError::Transport("connection refused".into()))
}

pub fn engine_with(scorer: Arc<RecordingScorer>) -> WizardEngine {
    WizardEngine::new(short_form(), scorer).expect("engine")
}

/// Fills every step of the short form and stops on the final one.
pub async fn fill_to_last(engine: &mut WizardEngine) {
    engine.set_answer("0,5").expect("heart rate");
    engine.advance().await.expect("advance heart rate");
    engine.set_answer("Female").expect("gender");
    engine.advance().await.expect("advance gender");
    engine.set_answer("5").expect("sleep");
}
