use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{
    BUSINESS_MAX_FILE_SIZE, BUSINESS_RETENTION_DAYS, BUSINESS_STORAGE_LIMIT, FREE_MAX_FILE_SIZE,
    FREE_RETENTION_DAYS, FREE_STORAGE_LIMIT, PRO_MAX_FILE_SIZE, PRO_RETENTION_DAYS,
    PRO_STORAGE_LIMIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Business,
}

/// Quotas and feature flags of a plan. Flags absent upstream are off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanLimits {
    /// Total storage in bytes
    pub storage_limit: u64,
    /// Largest single file in bytes
    pub max_file_size: u64,
    pub retention_days: u32,
    #[serde(default)]
    pub password_protection: bool,
    #[serde(default)]
    pub advanced_sharing: bool,
    #[serde(default)]
    pub team_collaboration: bool,
    #[serde(default)]
    pub advanced_security: bool,
}

impl PlanLimits {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => Self {
                storage_limit: FREE_STORAGE_LIMIT,
                max_file_size: FREE_MAX_FILE_SIZE,
                retention_days: FREE_RETENTION_DAYS,
                password_protection: false,
                advanced_sharing: false,
                team_collaboration: false,
                advanced_security: false,
            },
            SubscriptionTier::Pro => Self {
                storage_limit: PRO_STORAGE_LIMIT,
                max_file_size: PRO_MAX_FILE_SIZE,
                retention_days: PRO_RETENTION_DAYS,
                password_protection: true,
                advanced_sharing: true,
                team_collaboration: false,
                advanced_security: false,
            },
            SubscriptionTier::Business => Self {
                storage_limit: BUSINESS_STORAGE_LIMIT,
                max_file_size: BUSINESS_MAX_FILE_SIZE,
                retention_days: BUSINESS_RETENTION_DAYS,
                password_protection: true,
                advanced_sharing: true,
                team_collaboration: true,
                advanced_security: true,
            },
        }
    }
}

/// Caller's current plan as reported by the billing function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionStatus {
    pub tier: SubscriptionTier,
    pub limits: PlanLimits,
    /// End of the current billing period, paid plans only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end: Option<DateTime<Utc>>,
}

/// Entry of the public plan catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Plan {
    pub tier: SubscriptionTier,
    pub name: String,
    /// Monthly price in USD
    #[schema(value_type = String, example = "9")]
    pub price: Decimal,
    /// Checkout price id, absent for the free plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
    pub limits: PlanLimits,
    pub features: Vec<String>,
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn plan_catalog() -> Vec<Plan> {
    vec![
        Plan {
            tier: SubscriptionTier::Free,
            name: "Free".to_string(),
            price: Decimal::ZERO,
            price_id: None,
            limits: PlanLimits::for_tier(SubscriptionTier::Free),
            features: features(&[
                "500MB storage",
                "Max file size: 100MB",
                "Basic sharing options",
                "7-day file retention",
            ]),
        },
        Plan {
            tier: SubscriptionTier::Pro,
            name: "Pro".to_string(),
            price: Decimal::new(9, 0),
            price_id: Some("price_pro".to_string()),
            limits: PlanLimits::for_tier(SubscriptionTier::Pro),
            features: features(&[
                "25GB storage",
                "Max file size: 2GB",
                "Advanced sharing controls",
                "Password protection",
                "30-day file retention",
            ]),
        },
        Plan {
            tier: SubscriptionTier::Business,
            name: "Business".to_string(),
            price: Decimal::new(29, 0),
            price_id: Some("price_business".to_string()),
            limits: PlanLimits::for_tier(SubscriptionTier::Business),
            features: features(&[
                "100GB storage",
                "Max file size: 10GB",
                "Team collaboration tools",
                "Advanced security features",
                "Unlimited file retention",
                "Priority support",
            ]),
        },
    ]
}
