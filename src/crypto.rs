mod confirmation;
mod signing_key;
mod token;

pub use confirmation::Confirmation;
pub use signing_key::SigningKey;
pub use token::{Token, TokenBuilder, TokenError, TokenResult};
