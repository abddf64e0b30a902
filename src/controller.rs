pub mod delays;
pub mod notifications;
pub mod subscriptions;
pub mod tokens;
pub mod users;
