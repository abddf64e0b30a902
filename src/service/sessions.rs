use std::sync::Arc;

use chrono::Duration;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::crypto::{SigningKey, Token, TokenError};
use crate::model::SessionToken;
use crate::repo::{SessionStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session token is malformed")]
    Malformed,
    #[error("Session token signature is invalid")]
    InvalidSignature,
    #[error("Session token is expired")]
    Expired,
    #[error("Session has been revoked")]
    Revoked,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TokenError> for SessionError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => Self::Malformed,
            TokenError::InvalidSignature => Self::InvalidSignature,
            TokenError::Expired => Self::Expired,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Signed payload of a session token
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    tid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uid: Option<Uuid>,
}

/// Claims that passed the signature check but have not been looked up yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub token_id: Uuid,
    pub user_id: Option<Uuid>,
}

/// Issues session rows and the signed strings that point at them.
///
/// Decoding happens in two stages: [`SessionService::verify`] checks the
/// signature and shape without touching storage, then [`SessionService::resolve`]
/// requires the row to still exist.
#[derive(Clone)]
pub struct SessionService {
    key: SigningKey,
    sessions: Arc<dyn SessionStore>,
    ttl: Option<Duration>,
    embed_user_id: bool,
}

impl SessionService {
    pub fn new(key: SigningKey, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            key,
            sessions,
            ttl: None,
            embed_user_id: false,
        }
    }

    /// Encoded tokens carry an expiry claim this far in the future
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Encoded tokens also carry the owning user id
    pub fn embedding_user_id(mut self, embed_user_id: bool) -> Self {
        self.embed_user_id = embed_user_id;
        self
    }

    #[tracing::instrument("Issue a session", skip(self))]
    pub async fn issue(&self, user_id: Uuid) -> SessionResult<SessionToken> {
        let token = SessionToken::new(user_id);
        self.sessions.insert(&token).await?;
        Ok(token)
    }

    pub fn encode(&self, token: &SessionToken) -> SessionResult<Token> {
        let claims = SessionClaims {
            tid: token.token_id,
            uid: self.embed_user_id.then_some(token.user_id),
        };

        let builder = Token::builder(claims);
        let builder = match self.ttl {
            Some(ttl) => builder.expires_in(ttl),
            None => builder,
        };
        Ok(builder.sign(self.key.as_ref())?)
    }

    /// Signature and shape check only
    pub fn verify(&self, encoded: &str) -> SessionResult<VerifiedClaims> {
        let claims: SessionClaims = encoded.parse::<Token>()?.verify(self.key.as_ref())?;
        Ok(VerifiedClaims {
            token_id: claims.tid,
            user_id: claims.uid,
        })
    }

    /// Look the verified claims up. The returned record is the stored row.
    #[tracing::instrument("Resolve a session", skip(self))]
    pub async fn resolve(&self, claims: VerifiedClaims) -> SessionResult<SessionToken> {
        let token = self
            .sessions
            .fetch(claims.token_id)
            .await?
            .ok_or(SessionError::Revoked)?;

        match claims.user_id {
            Some(user_id) if user_id != token.user_id => Err(SessionError::Malformed),
            _ => Ok(token),
        }
    }

    pub async fn decode(&self, encoded: &str) -> SessionResult<SessionToken> {
        let claims = self.verify(encoded)?;
        self.resolve(claims).await
    }

    /// Delete the session row; every encoded form of it stops decoding
    #[tracing::instrument("Revoke a session", skip(self))]
    pub async fn revoke(&self, token_id: Uuid) -> SessionResult<bool> {
        Ok(self.sessions.delete(token_id).await?)
    }
}
