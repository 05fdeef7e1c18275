use std::time::Duration;

use thiserror::Error;

use super::types::{ModelInput, RiskAssessment};

/// Used when no prediction service URL is configured.
pub const DEFAULT_PREDICTION_URL: &str = "http://localhost:5000/predict";

/// Upper bound on one prediction service call.
pub const PREDICTION_TIMEOUT_SECS: u64 = 10;

/// Why the external prediction service could not be used.
///
/// Never surfaced to callers of the pipeline: the orchestrator absorbs it
/// by falling back to the rule-based scorer.
#[derive(Error, Debug)]
pub enum ServiceUnavailable {
    #[error("prediction service unreachable at {0}")]
    Connection(String),

    #[error("prediction service timed out after {0}s")]
    Timeout(u64),

    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// External risk prediction backend.
pub trait PredictionClient: Send + Sync {
    /// One attempt, no retries. Every failure mode maps to `ServiceUnavailable`.
    fn predict(&self, input: &ModelInput) -> Result<RiskAssessment, ServiceUnavailable>;
}

/// Blocking HTTP client for the prediction service.
pub struct HttpPredictionClient {
    url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPredictionClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, ServiceUnavailable> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceUnavailable::HttpClient(e.to_string()))?;

        Ok(Self {
            url: url.trim().to_string(),
            client,
            timeout_secs,
        })
    }
}

impl PredictionClient for HttpPredictionClient {
    fn predict(&self, input: &ModelInput) -> Result<RiskAssessment, ServiceUnavailable> {
        let response = self
            .client
            .post(&self.url)
            .json(input.request_body())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceUnavailable::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    ServiceUnavailable::Connection(self.url.clone())
                } else {
                    ServiceUnavailable::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceUnavailable::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RiskAssessment = response.json().map_err(|e| {
            if e.is_timeout() {
                ServiceUnavailable::Timeout(self.timeout_secs)
            } else {
                ServiceUnavailable::MalformedResponse(e.to_string())
            }
        })?;

        if !parsed.score.is_finite() {
            return Err(ServiceUnavailable::MalformedResponse(format!(
                "score is not a finite number: {}",
                parsed.score
            )));
        }

        Ok(parsed)
    }
}
