use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::PRICE_ID_REGEX;

/// Request DTO for starting a checkout
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequestDto {
    /// Price id of the plan, e.g. `price_pro`
    #[serde(alias = "priceId")]
    #[validate(length(min = 1, message = "Price ID is required"))]
    #[validate(regex(path = *PRICE_ID_REGEX, message = "Invalid price ID"))]
    #[schema(example = "price_pro")]
    pub price_id: String,
}

/// Hosted checkout page to send the caller to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponseDto {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_both_spellings() {
        let snake: CheckoutRequestDto =
            serde_json::from_value(json!({"price_id": "price_pro"})).unwrap();
        let camel: CheckoutRequestDto =
            serde_json::from_value(json!({"priceId": "price_pro"})).unwrap();
        assert_eq!(snake.price_id, camel.price_id);
        assert!(snake.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_price_ids() {
        for price_id in ["", "pro", "price_", "price pro"] {
            let dto = CheckoutRequestDto {
                price_id: price_id.to_string(),
            };
            assert!(dto.validate().is_err(), "{price_id:?} should be rejected");
        }
    }
}
