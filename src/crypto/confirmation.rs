use serde::{Deserialize, Serialize};

use uuid::Uuid;

use super::{SigningKey, Token, TokenResult};

/// Signed proof that an email confirmation link was issued for a user
#[derive(Debug, Serialize, Deserialize)]
pub struct Confirmation {
    confirm: Uuid,
}

impl From<Confirmation> for Uuid {
    fn from(value: Confirmation) -> Uuid {
        value.confirm
    }
}

impl From<Uuid> for Confirmation {
    fn from(value: Uuid) -> Self {
        Self { confirm: value }
    }
}

impl Confirmation {
    pub fn sign(&self, key: &SigningKey) -> TokenResult<Token> {
        Token::builder(self).sign(key.as_ref())
    }

    #[cfg(test)]
    pub fn verify(key: &SigningKey, token: &str) -> TokenResult<Self> {
        token.parse::<Token>()?.verify(key.as_ref())
    }
}
