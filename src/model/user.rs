use chrono::{DateTime, SubsecRound, Utc};

use secrecy::Secret;

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{EmailAddress, PersonName};

/// Email and password hash of a registered user, always stored together
#[derive(Debug)]
pub struct Registration {
    pub email: EmailAddress,
    pub password_hash: Secret<String>,
}

/// User record about to be persisted
#[derive(Debug)]
pub struct NewUser {
    pub id: Uuid,
    pub name: Option<PersonName>,
    /// `None` for anonymous users
    pub registration: Option<Registration>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn registered(name: Option<PersonName>, registration: Registration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            registration: Some(registration),
            created_at: Utc::now().trunc_subsecs(0),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            registration: None,
            created_at: Utc::now().trunc_subsecs(0),
        }
    }
}

/// Stored user identity. The password hash is never part of this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_anonymous(&self) -> bool {
        self.email.is_none()
    }
}

impl From<&NewUser> for User {
    fn from(new_user: &NewUser) -> Self {
        Self {
            id: new_user.id,
            name: new_user.name.as_ref().map(|name| name.as_ref().to_string()),
            email: new_user
                .registration
                .as_ref()
                .map(|registration| registration.email.as_ref().to_string()),
            email_confirmed: false,
            created_at: new_user.created_at,
        }
    }
}

/// The stored password hash for a registered email
#[derive(Debug)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: Secret<String>,
}
