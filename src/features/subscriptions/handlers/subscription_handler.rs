use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::subscriptions::dtos::{CheckoutRequestDto, CheckoutResponseDto};
use crate::features::subscriptions::models::{Plan, SubscriptionStatus};
use crate::features::subscriptions::services::SubscriptionService;
use crate::shared::types::{ApiResponse, Meta};
use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

/// Current plan and limits of the caller
#[utoipa::path(
    get,
    path = "/api/subscriptions/status",
    responses(
        (status = 200, description = "Subscription status", body = ApiResponse<SubscriptionStatus>),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Billing function failed")
    ),
    tag = "subscriptions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_status(
    user: AuthenticatedUser,
    State(service): State<Arc<SubscriptionService>>,
) -> Result<Json<ApiResponse<SubscriptionStatus>>> {
    let status = service.check_subscription(&user.access_token).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Start a checkout for a paid plan
#[utoipa::path(
    post,
    path = "/api/subscriptions/checkout",
    request_body = CheckoutRequestDto,
    responses(
        (status = 200, description = "Checkout page URL", body = ApiResponse<CheckoutResponseDto>),
        (status = 400, description = "Invalid price ID"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Billing function failed")
    ),
    tag = "subscriptions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_checkout(
    user: AuthenticatedUser,
    State(service): State<Arc<SubscriptionService>>,
    AppJson(dto): AppJson<CheckoutRequestDto>,
) -> Result<Json<ApiResponse<CheckoutResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let checkout = service
        .create_checkout(&user.access_token, &dto.price_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(checkout), None, None)))
}

/// Available plans
#[utoipa::path(
    get,
    path = "/api/subscriptions/plans",
    responses(
        (status = 200, description = "Plan catalog", body = ApiResponse<Vec<Plan>>)
    ),
    tag = "subscriptions"
)]
pub async fn list_plans(
    State(service): State<Arc<SubscriptionService>>,
) -> Result<Json<ApiResponse<Vec<Plan>>>> {
    let plans = service.plans();
    let total = plans.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(plans),
        None,
        Some(Meta { total }),
    )))
}
