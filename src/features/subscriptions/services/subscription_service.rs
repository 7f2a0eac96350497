use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::subscriptions::dtos::CheckoutResponseDto;
use crate::features::subscriptions::models::{plan_catalog, Plan, SubscriptionStatus};
use crate::modules::functions::RemoteFunctions;
use crate::shared::validation::PRICE_ID_REGEX;

const CHECK_SUBSCRIPTION: &str = "check-subscription";
const CREATE_CHECKOUT: &str = "create-checkout";

/// Plan lookups and checkout, delegated to remote billing functions.
/// Every call goes upstream; nothing is cached.
pub struct SubscriptionService {
    functions: Arc<dyn RemoteFunctions>,
}

impl SubscriptionService {
    pub fn new(functions: Arc<dyn RemoteFunctions>) -> Self {
        Self { functions }
    }

    pub async fn check_subscription(&self, bearer_token: &str) -> Result<SubscriptionStatus> {
        let value = self
            .functions
            .invoke(CHECK_SUBSCRIPTION, bearer_token, json!({}))
            .await?;

        let status: SubscriptionStatus = parse_response(CHECK_SUBSCRIPTION, value)?;
        debug!("Subscription tier: {:?}", status.tier);
        Ok(status)
    }

    pub async fn create_checkout(
        &self,
        bearer_token: &str,
        price_id: &str,
    ) -> Result<CheckoutResponseDto> {
        if !PRICE_ID_REGEX.is_match(price_id) {
            return Err(AppError::Validation(format!(
                "Invalid price ID '{}'",
                price_id
            )));
        }

        let value = self
            .functions
            .invoke(CREATE_CHECKOUT, bearer_token, json!({ "priceId": price_id }))
            .await?;

        let checkout: CheckoutResponseDto = parse_response(CREATE_CHECKOUT, value)?;
        if checkout.url.is_empty() {
            return Err(AppError::ExternalServiceError(format!(
                "{} returned no checkout URL",
                CREATE_CHECKOUT
            )));
        }

        info!("Checkout session created for {}", price_id);
        Ok(checkout)
    }

    pub fn plans(&self) -> Vec<Plan> {
        plan_catalog()
    }
}

fn parse_response<T: serde::de::DeserializeOwned>(name: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        AppError::ExternalServiceError(format!("{} returned an unexpected body: {}", name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::{PlanLimits, SubscriptionTier};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a canned result and records each call
    struct ScriptedFunctions {
        result: std::result::Result<Value, String>,
        calls: Mutex<Vec<(String, String, Value)>>,
    }

    impl ScriptedFunctions {
        fn ok(value: Value) -> Self {
            Self {
                result: Ok(value),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteFunctions for ScriptedFunctions {
        async fn invoke(&self, name: &str, bearer_token: &str, body: Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), bearer_token.to_string(), body));
            self.result
                .clone()
                .map_err(AppError::ExternalServiceError)
        }
    }

    #[tokio::test]
    async fn test_check_subscription_forwards_token() {
        let functions = Arc::new(ScriptedFunctions::ok(json!({
            "tier": "business",
            "limits": {
                "storage_limit": 107374182400u64,
                "max_file_size": 10737418240u64,
                "retention_days": 365,
                "password_protection": true,
                "advanced_sharing": true,
                "team_collaboration": true,
                "advanced_security": true
            },
            "subscription_end": "2026-12-01T00:00:00Z"
        })));
        let service = SubscriptionService::new(functions.clone());

        let status = service.check_subscription("token-1").await.unwrap();

        assert_eq!(status.tier, SubscriptionTier::Business);
        assert_eq!(
            status.limits,
            PlanLimits::for_tier(SubscriptionTier::Business)
        );
        let calls = functions.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "check-subscription");
        assert_eq!(calls[0].1, "token-1");
    }

    #[tokio::test]
    async fn test_check_subscription_surfaces_upstream_error() {
        let service =
            SubscriptionService::new(Arc::new(ScriptedFunctions::failing("User not authenticated")));

        let result = service.check_subscription("token-1").await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[tokio::test]
    async fn test_check_subscription_rejects_malformed_body() {
        let service = SubscriptionService::new(Arc::new(ScriptedFunctions::ok(json!({
            "tier": "free"
        }))));

        let result = service.check_subscription("token-1").await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[tokio::test]
    async fn test_create_checkout_sends_price_id() {
        let functions = Arc::new(ScriptedFunctions::ok(json!({
            "url": "https://checkout.example.com/session/abc"
        })));
        let service = SubscriptionService::new(functions.clone());

        let checkout = service.create_checkout("token-1", "price_pro").await.unwrap();

        assert_eq!(checkout.url, "https://checkout.example.com/session/abc");
        let calls = functions.calls.lock().unwrap();
        assert_eq!(calls[0].0, "create-checkout");
        assert_eq!(calls[0].2, json!({"priceId": "price_pro"}));
    }

    #[tokio::test]
    async fn test_invalid_price_id_never_reaches_upstream() {
        let functions = Arc::new(ScriptedFunctions::ok(json!({"url": "x"})));
        let service = SubscriptionService::new(functions.clone());

        let result = service.create_checkout("token-1", "").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(functions.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_without_url_is_an_error() {
        let service = SubscriptionService::new(Arc::new(ScriptedFunctions::ok(json!({"url": ""}))));

        let result = service.create_checkout("token-1", "price_pro").await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }
}
