use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// User as reported by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    pub fn name(&self) -> Option<String> {
        self.user_metadata
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
    }
}

/// Session returned by signup or login. Signup returns no tokens while the
/// email address still needs confirming.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Parse either a full session (`{access_token, ..., user}`) or a bare
    /// user object
    pub fn from_value(value: Value) -> Result<Self> {
        let user_value = value.get("user").cloned().unwrap_or_else(|| value.clone());
        let user: AuthUser = serde_json::from_value(user_value).map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse auth response: {}", e))
        })?;

        let text = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);

        Ok(Self {
            access_token: text("access_token"),
            token_type: text("token_type"),
            expires_in: value.get("expires_in").and_then(Value::as_i64),
            refresh_token: text("refresh_token"),
            user,
        })
    }
}

/// Managed auth service operations
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str, name: Option<&str>)
        -> Result<AuthSession>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;
}

/// Auth error body (`msg`, `error_description` or `error` depending on endpoint)
#[derive(Debug, Deserialize, Default)]
struct AuthErrorResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthErrorResponse {
    fn message(self) -> String {
        self.msg
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// HTTP client for the hosted auth service
pub struct HttpAuthClient {
    http_client: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl HttpAuthClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            auth_url: config.auth_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<(reqwest::StatusCode, String)> {
        let response = self
            .http_client
            .post(format!("{}{}", self.auth_url, path))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach auth service: {}", e);
                AppError::ExternalServiceError(format!("Failed to reach auth service: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

fn parse_session(text: &str) -> Result<AuthSession> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        AppError::ExternalServiceError(format!("Failed to parse auth response: {}", e))
    })?;
    AuthSession::from_value(value)
}

fn error_message(text: &str) -> String {
    serde_json::from_str::<AuthErrorResponse>(text)
        .unwrap_or_default()
        .message()
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthSession> {
        tracing::debug!("Signing up user: {}", email);

        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name.unwrap_or_else(|| email.split('@').next().unwrap_or(email)) },
        });
        let (status, text) = self.post("/signup", body).await?;

        if status.is_success() {
            let session = parse_session(&text)?;
            tracing::info!("Signed up user: {}", session.user.id);
            return Ok(session);
        }

        let message = error_message(&text);
        if status.as_u16() == 422 || message.to_lowercase().contains("already registered") {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if status.is_client_error() {
            return Err(AppError::Validation(message));
        }

        tracing::error!("Auth service error: HTTP {} - {}", status, message);
        Err(AppError::ExternalServiceError(format!(
            "Auth service error: HTTP {}",
            status
        )))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        tracing::debug!("Signing in user: {}", email);

        let body = json!({ "email": email, "password": password });
        let (status, text) = self.post("/token?grant_type=password", body).await?;

        if status.is_success() {
            return parse_session(&text);
        }

        if status.is_client_error() {
            tracing::debug!("Sign in rejected: {}", error_message(&text));
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        tracing::error!("Auth service error: HTTP {}", status);
        Err(AppError::ExternalServiceError(format!(
            "Auth service error: HTTP {}",
            status
        )))
    }
}
