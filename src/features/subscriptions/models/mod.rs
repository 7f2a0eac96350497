pub mod plan;

pub use plan::{plan_catalog, Plan, PlanLimits, SubscriptionStatus, SubscriptionTier};
