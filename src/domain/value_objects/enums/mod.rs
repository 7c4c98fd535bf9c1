pub mod membership_roles;
pub mod membership_statuses;
pub mod payment_statuses;
pub mod subscription_statuses;
