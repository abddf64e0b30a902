mod channels;
mod credentials;
mod delays;
mod sessions;
mod subscriptions;

pub use channels::ChannelService;
pub use credentials::{CredentialError, CredentialService};
pub use delays::{correlate, DelayError, DelayService};
pub use sessions::{SessionError, SessionResult, SessionService, VerifiedClaims};
pub use subscriptions::{SubscriptionError, SubscriptionService};
