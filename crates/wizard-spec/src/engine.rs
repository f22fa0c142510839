use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::answers::{AnswerSet, AnswerValue, Answers, InputError};
use crate::scoring::{PredictionResult, ScoreResponse, Scorer, ScoringError, USER_FACING_FAILURE};
use crate::spec::question::QuestionSpec;
use crate::spec::questionnaire::{CatalogError, Questionnaire};
use crate::validate::{ValidationError, validate_step};

/// Lifecycle of the remote scoring call.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded { result: PredictionResult },
    Failed { message: String },
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::InFlight => "in_flight",
            SubmissionState::Succeeded { .. } => "succeeded",
            SubmissionState::Failed { .. } => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }

    pub fn has_outcome(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. }
        )
    }
}

/// Errors reported by engine operations. None of them are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("a submission is already in flight")]
    Busy,
    #[error("a prediction is shown; edit or restart first")]
    ResultShown,
}

/// Outcome of a successful [`WizardEngine::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Moved { position: usize },
    /// The final step validated and a submission ran.
    Submitted,
}

/// Per-step marker for progress strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMark {
    Done,
    Active,
    Pending,
}

/// Proof that a submission was started; hand it back with the outcome.
///
/// Tickets issued before a [`WizardEngine::reset`] are stale and their
/// outcome is dropped.
#[derive(Debug)]
pub struct SubmissionTicket {
    epoch: u64,
    body: Value,
}

impl SubmissionTicket {
    /// Request body captured when the submission started.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Mutable session record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub position: usize,
    pub answers: Answers,
    pub validation_error: Option<String>,
    pub submission: SubmissionState,
}

/// Drives question sequencing, validation and submission for one session.
pub struct WizardEngine {
    questionnaire: Questionnaire,
    scorer: Arc<dyn Scorer>,
    state: WizardState,
    epoch: u64,
}

impl WizardEngine {
    pub fn new(questionnaire: Questionnaire, scorer: Arc<dyn Scorer>) -> Result<Self, CatalogError> {
        questionnaire.check()?;
        Ok(Self {
            questionnaire,
            scorer,
            state: WizardState::default(),
            epoch: 0,
        })
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn position(&self) -> usize {
        self.state.position
    }

    pub fn len(&self) -> usize {
        self.questionnaire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questionnaire.is_empty()
    }

    pub fn current_question(&self) -> &QuestionSpec {
        &self.questionnaire.questions[self.state.position]
    }

    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.state.answers.get(&self.current_question().key)
    }

    pub fn answers(&self) -> &Answers {
        &self.state.answers
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.state.validation_error.as_deref()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.state.submission
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state.submission {
            SubmissionState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        (self.state.position + 1) as f64 / self.len() as f64
    }

    pub fn is_final_step(&self) -> bool {
        self.state.position + 1 == self.len()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.position > 0
    }

    pub fn step_marks(&self) -> Vec<StepMark> {
        (0..self.len())
            .map(|index| match index.cmp(&self.state.position) {
                std::cmp::Ordering::Less => StepMark::Done,
                std::cmp::Ordering::Equal => StepMark::Active,
                std::cmp::Ordering::Greater => StepMark::Pending,
            })
            .collect()
    }

    pub fn answer_set(&self) -> AnswerSet {
        AnswerSet {
            form_id: self.questionnaire.id.clone(),
            spec_version: self.questionnaire.version.clone(),
            answers: self.state.answers.clone(),
        }
    }

    /// Stores `raw` for the current question without validating it.
    ///
    /// Input that cannot be coerced for the question's kind leaves the state
    /// untouched.
    pub fn set_answer(&mut self, raw: &str) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let question = self.current_question();
        let value = AnswerValue::coerce(question, raw)?;
        let key = question.key.clone();
        self.state.answers.insert(key, value);
        self.state.validation_error = None;
        Ok(())
    }

    /// Validates the current answer and moves forward. On the final step this
    /// submits the answers instead.
    pub async fn advance(&mut self) -> Result<Advance, EngineError> {
        self.ensure_editable()?;
        self.state.validation_error = None;

        let question = self.current_question();
        if let Err(error) = validate_step(question, self.current_answer()) {
            debug!(key = %question.key, %error, "step rejected");
            self.state.validation_error = Some(error.to_string());
            return Err(error.into());
        }

        if self.is_final_step() {
            self.submit().await;
            return Ok(Advance::Submitted);
        }

        self.state.position += 1;
        debug!(position = self.state.position, "advanced");
        Ok(Advance::Moved {
            position: self.state.position,
        })
    }

    /// Steps back one question. Does nothing on the first question.
    ///
    /// Leaving the final step drops a failed submission, since retrying only
    /// happens from there.
    pub fn retreat(&mut self) -> Result<(), EngineError> {
        self.ensure_editable()?;
        if self.state.position > 0 {
            self.state.position -= 1;
            self.state.validation_error = None;
            if matches!(self.state.submission, SubmissionState::Failed { .. }) {
                self.state.submission = SubmissionState::Idle;
            }
            debug!(position = self.state.position, "retreated");
        }
        Ok(())
    }

    /// Runs a full submission against the configured scorer.
    ///
    /// Ignored while another submission is in flight or a result is shown.
    pub async fn submit(&mut self) -> &SubmissionState {
        if let Some(ticket) = self.begin_submission() {
            let scorer = Arc::clone(&self.scorer);
            let outcome = scorer.score(ticket.body()).await;
            self.finish_submission(ticket, outcome);
        }
        &self.state.submission
    }

    /// Moves to `InFlight` and returns the request to send, or `None` when a
    /// submission is already running or has succeeded.
    pub fn begin_submission(&mut self) -> Option<SubmissionTicket> {
        if let Err(error) = self.ensure_editable() {
            debug!(%error, "duplicate submission suppressed");
            return None;
        }
        self.state.submission = SubmissionState::InFlight;
        self.state.validation_error = None;
        debug!(epoch = self.epoch, "submission started");
        Some(SubmissionTicket {
            epoch: self.epoch,
            body: self.state.answers.to_request_body(),
        })
    }

    /// Records the scorer outcome for `ticket`. Returns `false` when the
    /// ticket is stale and the outcome was dropped.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<ScoreResponse, ScoringError>,
    ) -> bool {
        if ticket.epoch != self.epoch || !self.state.submission.is_in_flight() {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "stale submission outcome dropped"
            );
            return false;
        }

        self.state.submission = match outcome.and_then(ScoreResponse::checked) {
            Ok(response) => {
                let result = PredictionResult::from(response);
                debug!(risk = result.risk_flag, confidence = result.confidence, "scored");
                SubmissionState::Succeeded { result }
            }
            Err(error) => {
                warn!(%error, "scoring failed");
                SubmissionState::Failed {
                    message: USER_FACING_FAILURE.into(),
                }
            }
        };
        true
    }

    /// Clears the session. Any in-flight submission becomes stale.
    pub fn reset(&mut self) {
        if self.state.submission.is_in_flight() {
            debug!(epoch = self.epoch, "reset while submission in flight");
        }
        self.epoch += 1;
        self.state = WizardState::default();
    }

    /// Leaves the result screen, keeping position and answers.
    pub fn edit_after_result(&mut self) {
        if self.state.submission.has_outcome() {
            self.state.submission = SubmissionState::Idle;
        }
    }

    /// Answers may change while idle or after a failure, never while a request
    /// is pending or its result is on screen.
    fn ensure_editable(&self) -> Result<(), EngineError> {
        match self.state.submission {
            SubmissionState::InFlight => Err(EngineError::Busy),
            SubmissionState::Succeeded { .. } => Err(EngineError::ResultShown),
            SubmissionState::Idle | SubmissionState::Failed { .. } => Ok(()),
        }
    }
}
