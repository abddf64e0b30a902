mod channel;
mod delay;
mod session;
mod subscription;
mod user;

pub use channel::{NewNotificationChannel, NotificationChannel};
pub use delay::{DelayFeed, DelayedTrip, NextStop};
pub use session::SessionToken;
pub use subscription::{NewSubscription, Subscription};
pub use user::{NewUser, Registration, User, UserCredentials};
