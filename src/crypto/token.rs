use std::fmt;
use std::str::FromStr;

use hmac::Mac;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use chrono::{Duration, TimeZone, Utc};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Reasons a token can be refused
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature does not match")]
    InvalidSignature,
    #[error("Token is expired")]
    Expired,
    #[error("Token is malformed or missing required claims")]
    Malformed,
}

impl From<base64::DecodeError> for TokenError {
    fn from(_e: base64::DecodeError) -> Self {
        Self::Malformed
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(_e: serde_json::Error) -> Self {
        Self::Malformed
    }
}

pub type TokenResult<T> = Result<T, TokenError>;

/// An opaque, HMAC-signed bearer token.
///
/// Encoded as `base64url(claims json) "." base64url(mac)`. The claims carry an
/// optional `exp` unix timestamp next to the payload under `data`.
#[derive(Clone, PartialEq)]
pub struct Token {
    encoded: String,
    dot: usize,
}

impl Token {
    pub fn builder<T: Serialize>(payload: T) -> TokenBuilder<T> {
        TokenBuilder {
            payload,
            expires: None,
        }
    }

    /// Check the signature, then the claims. Nothing inside the token is
    /// parsed until the signature has matched.
    pub fn verify<T, K>(&self, key: &K) -> TokenResult<T>
    where
        T: DeserializeOwned,
        K: Mac + Clone,
    {
        let (claims, mac) = self.segments();
        let claims = URL_SAFE_NO_PAD.decode(claims)?;
        let mac = URL_SAFE_NO_PAD.decode(mac)?;

        key.clone()
            .chain_update(&claims)
            .verify_slice(&mac)
            .map_err(|_| TokenError::InvalidSignature)?;

        serde_json::from_slice::<Claims<T>>(&claims)?.into_payload()
    }

    fn segments(&self) -> (&str, &str) {
        (&self.encoded[..self.dot], &self.encoded[self.dot + 1..])
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.trim();
        match encoded.find('.') {
            Some(dot) if dot > 0 && dot + 1 < encoded.len() && !encoded[dot + 1..].contains('.') => {
                Ok(Self {
                    encoded: encoded.to_string(),
                    dot,
                })
            }
            _ => Err(TokenError::Malformed),
        }
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

#[derive(Debug)]
pub struct TokenBuilder<T> {
    payload: T,
    expires: Option<i64>,
}

impl<T: Serialize> TokenBuilder<T> {
    /// Refuse the token once `ttl` has passed
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires = Some((Utc::now() + ttl).timestamp());
        self
    }

    pub fn sign<K>(self, key: &K) -> TokenResult<Token>
    where
        K: Mac + Clone,
    {
        let claims = serde_json::to_vec(&Claims {
            exp: self.expires,
            data: self.payload,
        })?;
        let mac = key.clone().chain_update(&claims).finalize().into_bytes();

        let claims = URL_SAFE_NO_PAD.encode(claims);
        let dot = claims.len();
        let encoded = format!("{}.{}", claims, URL_SAFE_NO_PAD.encode(mac));

        Ok(Token { encoded, dot })
    }
}

#[derive(Serialize, Deserialize)]
struct Claims<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    data: T,
}

impl<T> Claims<T> {
    fn into_payload(self) -> TokenResult<T> {
        let expired = match self.exp {
            None => false,
            // NOTE: an expiry chrono cannot represent is treated as already passed
            Some(exp) => Utc
                .timestamp_opt(exp, 0)
                .earliest()
                .map_or(true, |exp| Utc::now() >= exp),
        };

        if expired {
            Err(TokenError::Expired)
        } else {
            Ok(self.data)
        }
    }
}
