use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8020/predict";

/// Message shown for every scoring failure. Causes are only logged.
pub const USER_FACING_FAILURE: &str = "could not reach scoring service";

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring request failed: {0}")]
    Transport(String),
    #[error("scoring service answered with status {0}")]
    Status(u16),
    #[error("malformed scoring response: {0}")]
    Malformed(String),
}

/// Raw response body of the scoring service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub prediction: u8,
    pub probability: f64,
}

impl ScoreResponse {
    /// Rejects responses outside the documented domain.
    pub fn checked(self) -> Result<Self, ScoringError> {
        if self.prediction > 1 {
            return Err(ScoringError::Malformed(format!(
                "prediction {} is not 0 or 1",
                self.prediction
            )));
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ScoringError::Malformed(format!(
                "probability {} is outside [0, 1]",
                self.probability
            )));
        }
        Ok(self)
    }
}

/// Verdict kept by the wizard after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub risk_flag: bool,
    /// Full precision; use [`PredictionResult::confidence_display`] for output.
    pub confidence: f64,
}

impl PredictionResult {
    pub fn confidence_display(&self) -> String {
        format!("{:.3}", self.confidence)
    }

    pub fn verdict(&self) -> &'static str {
        if self.risk_flag {
            "High risk"
        } else {
            "Low risk"
        }
    }

    pub fn summary(&self) -> &'static str {
        if self.risk_flag {
            "A high risk of cardiovascular disease was detected"
        } else {
            "The risk of cardiovascular disease is within the normal range"
        }
    }
}

impl From<ScoreResponse> for PredictionResult {
    fn from(response: ScoreResponse) -> Self {
        Self {
            risk_flag: response.prediction == 1,
            confidence: response.probability,
        }
    }
}

/// Remote service that turns an answer record into a prediction.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, body: &Value) -> Result<ScoreResponse, ScoringError>;
}

/// Where and how to reach the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerConfig {
    pub endpoint: String,
    /// `None` waits for the service indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout: None,
        }
    }
}

impl ScorerConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// JSON-over-HTTP scorer.
#[derive(Debug, Clone)]
pub struct HttpScorer {
    endpoint: String,
    client: Client,
}

impl HttpScorer {
    pub fn new(config: ScorerConfig) -> Result<Self, ScoringError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ScoringError::Transport(err.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn score(&self, body: &Value) -> Result<ScoreResponse, ScoringError> {
        debug!(endpoint = %self.endpoint, "posting answers to scorer");
        let res = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| ScoringError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ScoringError::Status(status.as_u16()));
        }

        let response: ScoreResponse = res
            .json()
            .await
            .map_err(|err| ScoringError::Malformed(err.to_string()))?;
        response.checked()
    }
}
