//! HTTP client for the hosted chat-completion endpoint.
//!
//! This module sends one schema-constrained completion request per journal
//! entry and turns the model's forced function call into a validated
//! [`MoodAnalysis`].

use super::prompts::analysis_messages;
use super::schema::{analysis_tool, forced_tool_choice};
use crate::analysis::MoodAnalysis;
use crate::config::{duplicate_secret, Config};
use crate::constants::{ANALYSIS_TOOL_NAME, ENV_VAR_AI_API_KEY};
use crate::errors::AIError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (system, user)
    pub role: String,
    /// The content of the message
    pub content: String,
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for a schema-constrained completion.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    tools: Vec<Value>,
    tool_choice: Value,
}

/// Response from the completion endpoint. Only the fields that are read are modelled.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    arguments: Value,
}

impl CompletionResponse {
    /// Decodes a raw completion body.
    pub fn from_body(body: &str) -> Result<Self, AIError> {
        serde_json::from_str(body).map_err(|e| AIError::InvalidResponse(e.to_string()))
    }

    /// Reads the first choice's first tool call and parses it as an analysis.
    ///
    /// # Errors
    ///
    /// - `AIError::NoToolCall` if the model answered without calling the function
    /// - `AIError::MalformedArguments` if the arguments are not an analysis object
    /// - `AIError::ContractViolation` if the analysis breaks a field bound
    pub fn into_analysis(self) -> Result<MoodAnalysis, AIError> {
        let message = match self.choices.into_iter().next() {
            Some(choice) => choice.message,
            None => return Err(AIError::NoToolCall),
        };

        let call = match message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            Some(call) => call,
            None => {
                if let Some(text) = message.content.as_deref() {
                    debug!("Model answered in free text: {}", text);
                }
                return Err(AIError::NoToolCall);
            }
        };

        if call.function.name != ANALYSIS_TOOL_NAME {
            warn!(
                "Model called '{}' instead of '{}'",
                call.function.name, ANALYSIS_TOOL_NAME
            );
        }

        // Arguments are specified as a JSON string; some gateways inline the object.
        match call.function.arguments {
            Value::String(text) => MoodAnalysis::from_json(&text),
            other => MoodAnalysis::from_json(&other.to_string()),
        }
    }
}

/// Client for the hosted chat-completion endpoint.
pub struct MoodGateway {
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    client: Client,
}

impl MoodGateway {
    /// Creates a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the chat-completions endpoint
    /// * `model` - Model identifier sent with every request
    /// * `api_key` - Bearer credential; its absence is reported per request
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            client: Client::new(),
        }
    }

    /// Creates a gateway client from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ai_url.clone(),
            config.ai_model.clone(),
            config.ai_api_key.as_ref().map(duplicate_secret),
        )
    }

    /// The model identifier this gateway requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyses one journal entry.
    ///
    /// Exactly one request is sent; nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential is not configured (checked before any network call)
    /// - The endpoint is unreachable or answers with a non-success status
    /// - The body is not a completion, carries no tool call, or the tool call
    ///   arguments are not a valid analysis
    pub async fn analyze(&self, entry_text: &str) -> Result<MoodAnalysis, AIError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AIError::MissingCredential(ENV_VAR_AI_API_KEY.to_string()))?;

        debug!("Analyzing mood for entry: {}", entry_text);

        let request = CompletionRequest {
            model: &self.model,
            messages: analysis_messages(entry_text),
            tools: vec![analysis_tool()],
            tool_choice: forced_tool_choice(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(AIError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("AI API error: {} {}", status, error_text);
            return Err(AIError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(AIError::Transport)?;
        debug!("AI response: {}", body);

        let analysis = CompletionResponse::from_body(&body)?.into_analysis()?;
        info!(
            mood_score = analysis.mood_score,
            mental_state = %analysis.mental_state,
            "Parsed analysis"
        );
        Ok(analysis)
    }
}
