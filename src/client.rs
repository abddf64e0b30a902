mod confirmation;
mod email_client;

pub use confirmation::ConfirmationMailer;
pub use email_client::{Email, EmailClient};
