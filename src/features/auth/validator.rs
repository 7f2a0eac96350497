use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

/// Validates HS256 access tokens issued by the managed auth service
pub struct JwtValidator {
    decoding_key: DecodingKey,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "aud")]
    _aud: AudienceClaim,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Audience can be either a single string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum AudienceClaim {
    Single(String),
    Multiple(Vec<String>),
}

impl JwtValidator {
    pub fn new(secret: &str, audience: String, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }

        Ok(AuthenticatedUser {
            sub: claims.sub,
            email: claims.email,
            role: claims.role,
            access_token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_token, TEST_AUDIENCE, TEST_JWT_SECRET};

    fn validator() -> JwtValidator {
        JwtValidator::new(
            TEST_JWT_SECRET,
            TEST_AUDIENCE.to_string(),
            Duration::from_secs(0),
        )
    }

    #[test]
    fn test_valid_token() {
        let token = issue_token("user-1", TEST_JWT_SECRET, TEST_AUDIENCE, 3600);
        let user = validator().validate_token(&token).unwrap();
        assert_eq!(user.sub, "user-1");
        assert_eq!(user.owner_id(), "user-1");
        assert_eq!(user.email.as_deref(), Some("user-1@example.com"));
        assert_eq!(user.access_token, token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("user-1", TEST_JWT_SECRET, TEST_AUDIENCE, -3600);
        assert!(matches!(
            validator().validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("user-1", "another-secret-value", TEST_AUDIENCE, 3600);
        assert!(validator().validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = issue_token("user-1", TEST_JWT_SECRET, "anon", 3600);
        assert!(validator().validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validator().validate_token("not-a-jwt").is_err());
    }
}
