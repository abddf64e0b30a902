use chrono::{DateTime, SubsecRound, Utc};

use uuid::Uuid;

/// Server-side record of an authenticated session.
/// Deleting the row revokes every encoded token that points at it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionToken {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// A fresh session for `user_id`, stamped at second resolution
    pub fn new(user_id: Uuid) -> Self {
        Self {
            token_id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now().trunc_subsecs(0),
        }
    }
}
