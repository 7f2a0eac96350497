pub mod subscription_service;

pub use subscription_service::SubscriptionService;
