use crate::features::subscriptions::handlers;
use crate::features::subscriptions::services::SubscriptionService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Protected subscription routes; calls are made with the caller's token
pub fn routes(service: Arc<SubscriptionService>) -> Router {
    Router::new()
        .route("/api/subscriptions/status", get(handlers::get_status))
        .route("/api/subscriptions/checkout", post(handlers::create_checkout))
        .with_state(service)
}

/// Public plan catalog
pub fn public_routes(service: Arc<SubscriptionService>) -> Router {
    Router::new()
        .route("/api/subscriptions/plans", get(handlers::list_plans))
        .with_state(service)
}
