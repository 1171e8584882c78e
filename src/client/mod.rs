//! Analysis request builder.
//!
//! Sends one journal entry to the mood analysis service and returns the
//! validated [`MoodAnalysis`]. Each client owns a submission gate so that a
//! single input surface never has two analyses in flight.

use crate::analysis::MoodAnalysis;
use crate::config::{duplicate_secret, Config};
use crate::constants::CLIENT_INFO;
use crate::errors::{AIError, AppResult, SubmissionError};
use crate::journal::JournalEntryInput;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Whether the client is waiting on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Analyzing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    entry_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Holds the submission gate closed until dropped.
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Client for the `/analyze-mood` endpoint.
pub struct AnalysisClient {
    http: Client,
    endpoint: String,
    client_key: Option<SecretString>,
    in_flight: AtomicBool,
}

impl AnalysisClient {
    /// Creates a client for the analysis endpoint at `endpoint`.
    pub fn new(endpoint: impl Into<String>, client_key: Option<SecretString>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            client_key,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Creates a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.service_url.clone(),
            config.client_key.as_ref().map(duplicate_secret),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current submission state.
    pub fn state(&self) -> SubmissionState {
        if self.in_flight.load(Ordering::Acquire) {
            SubmissionState::Analyzing
        } else {
            SubmissionState::Idle
        }
    }

    /// Closes the submission gate.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::AlreadyInFlight` if the gate is already closed.
    pub fn try_begin(&self) -> Result<InFlight<'_>, SubmissionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmissionError::AlreadyInFlight)?;
        Ok(InFlight {
            flag: &self.in_flight,
        })
    }

    /// Requests an analysis of `entry`.
    ///
    /// Exactly one POST is sent and nothing is retried. The gate is released
    /// when this future completes or is dropped.
    ///
    /// # Errors
    ///
    /// - `SubmissionError::AlreadyInFlight` if another analysis is running
    /// - `AIError::ServiceUnreachable` if the service cannot be reached
    /// - `AIError::Service` carrying the service's error message on a non-success status
    /// - `AIError::MalformedArguments` or `AIError::ContractViolation` if the
    ///   success body is not a valid analysis
    pub async fn analyze(&self, entry: &JournalEntryInput) -> AppResult<MoodAnalysis> {
        let _gate = self.try_begin()?;

        debug!("Sending entry to {}", self.endpoint);

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("x-client-info", CLIENT_INFO)
            .json(&AnalyzeRequest {
                entry_text: entry.as_str(),
            });

        if let Some(key) = &self.client_key {
            request = request
                .header("apikey", key.expose_secret())
                .bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(AIError::ServiceUnreachable)?;
        let status = response.status();
        let body = response.text().await.map_err(AIError::ServiceUnreachable)?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error_body) => error_body.error,
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            warn!("Analysis service returned {}: {}", status, message);
            return Err(AIError::Service(message).into());
        }

        let analysis = MoodAnalysis::from_json(&body)?;
        info!(
            "Received analysis: {} ({})",
            analysis.mental_state,
            analysis.rounded_score()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_gate_is_single_flight() {
        let client = AnalysisClient::new("http://127.0.0.1:9/analyze-mood", None);
        assert_eq!(client.state(), SubmissionState::Idle);

        let guard = client.try_begin().unwrap();
        assert_eq!(client.state(), SubmissionState::Analyzing);
        assert!(matches!(
            client.try_begin(),
            Err(SubmissionError::AlreadyInFlight)
        ));

        drop(guard);
        assert_eq!(client.state(), SubmissionState::Idle);
        assert!(client.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_analyze_rejected_while_in_flight() {
        // Port 9 is never contacted because the gate rejects first.
        let client = AnalysisClient::new("http://127.0.0.1:9/analyze-mood", None);
        let entry = JournalEntryInput::new("A quiet afternoon").unwrap();

        let _guard = client.try_begin().unwrap();
        match client.analyze(&entry).await {
            Err(AppError::Submission(SubmissionError::AlreadyInFlight)) => {}
            other => panic!("Expected AlreadyInFlight, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gate_released_after_transport_failure() {
        let client = AnalysisClient::new("http://127.0.0.1:9/analyze-mood", None);
        let entry = JournalEntryInput::new("A quiet afternoon").unwrap();

        match client.analyze(&entry).await {
            Err(AppError::AI(err @ AIError::ServiceUnreachable(_))) => {
                assert!(err.to_string().starts_with("Analysis service request failed"))
            }
            other => panic!("Expected ServiceUnreachable, got {:?}", other),
        }
        assert_eq!(client.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = serde_json::to_value(AnalyzeRequest {
            entry_text: "hello",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "entryText": "hello" }));
    }
}
