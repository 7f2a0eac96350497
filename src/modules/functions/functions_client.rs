use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::core::config::FunctionsConfig;
use crate::core::error::{AppError, Result};

/// Invokes named remote functions on behalf of a caller
#[async_trait]
pub trait RemoteFunctions: Send + Sync {
    /// POST `body` to function `name` with the caller's bearer token and
    /// return the decoded JSON response. One attempt, no retry.
    async fn invoke(&self, name: &str, bearer_token: &str, body: Value) -> Result<Value>;
}

/// Error body returned by the functions on failure
#[derive(Debug, Deserialize)]
struct FunctionErrorResponse {
    error: String,
}

pub struct FunctionsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FunctionsClient {
    pub fn new(config: &FunctionsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

/// Turn a function response into a value or an upstream error
fn interpret_response(name: &str, status: reqwest::StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        let message = serde_json::from_str::<FunctionErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        error!("Function '{}' failed: {}", name, message);
        return Err(AppError::ExternalServiceError(format!(
            "{} failed: {}",
            name, message
        )));
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::ExternalServiceError(format!("{} returned invalid JSON: {}", name, e))
    })?;

    // Functions may answer 200 with an error body
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(AppError::ExternalServiceError(format!(
            "{} failed: {}",
            name, message
        )));
    }

    Ok(value)
}

#[async_trait]
impl RemoteFunctions for FunctionsClient {
    async fn invoke(&self, name: &str, bearer_token: &str, body: Value) -> Result<Value> {
        debug!("Invoking remote function '{}'", name);

        let mut request = self
            .http_client
            .post(self.function_url(name))
            .bearer_auth(bearer_token)
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.header("apikey", &self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach function '{}': {}", name, e);
            AppError::ExternalServiceError(format!("Failed to reach {}: {}", name, e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to read {} response: {}", name, e))
        })?;

        interpret_response(name, status, &text)
    }
}
