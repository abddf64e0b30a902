use std::sync::Arc;

use anyhow::Context;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use secrecy::{ExposeSecret, Secret};

use uuid::Uuid;

use crate::domain::{EmailAddress, PersonName};
use crate::model::{NewUser, Registration, User};
use crate::repo::{StoreError, UserStore};
use crate::telemetry::spawn_blocking_with_tracing;

/// Verified in place of a real hash when the email is unknown, so both
/// failure paths pay for one password verification
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Email and password are both required")]
    MissingCredentials,
    #[error("No user is registered with this email")]
    EmailNotFound,
    #[error("Password does not match")]
    InvalidCredentials,
    #[error("User not found")]
    NotFound,
    #[error("Email address is already registered")]
    DuplicateEmail,
    #[error("Password hashing failed")]
    Hashing(#[source] anyhow::Error),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound,
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            other => Self::Store(other),
        }
    }
}

type CredentialResult<T> = Result<T, CredentialError>;

/// Creates and authenticates user identities
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a user with an email and password.
    /// An empty password is refused; callers route that case to an anonymous user.
    #[tracing::instrument("Create a registered user", skip(self, name, password))]
    pub async fn create_registered_user(
        &self,
        name: Option<PersonName>,
        email: EmailAddress,
        password: Secret<String>,
    ) -> CredentialResult<User> {
        if password.expose_secret().is_empty() {
            return Err(CredentialError::MissingCredentials);
        }

        let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
            .await
            .context("Failed to spawn blocking task")
            .map_err(CredentialError::Hashing)??;

        let new_user = NewUser::registered(
            name,
            Registration {
                email,
                password_hash,
            },
        );
        Ok(self.users.insert(&new_user).await?)
    }

    #[tracing::instrument("Create an anonymous user", skip(self))]
    pub async fn create_anonymous_user(&self) -> CredentialResult<User> {
        Ok(self.users.insert(&NewUser::anonymous()).await?)
    }

    /// Check an email/password pair against the stored hash
    #[tracing::instrument("Authenticate a user", skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &EmailAddress,
        password: Secret<String>,
    ) -> CredentialResult<User> {
        let (user_id, password_hash) = match self.users.fetch_credentials_by_email(email).await? {
            Some(creds) => (Some(creds.id), creds.password_hash),
            None => (None, Secret::new(DUMMY_PASSWORD_HASH.to_string())),
        };

        let matched =
            spawn_blocking_with_tracing(move || verify_password_hash(password, password_hash))
                .await
                .context("Failed to spawn blocking task")
                .map_err(CredentialError::Hashing)??;

        match user_id {
            None => Err(CredentialError::EmailNotFound),
            Some(_) if !matched => Err(CredentialError::InvalidCredentials),
            Some(id) => self.get_user(id).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> CredentialResult<User> {
        Ok(self.users.fetch(id).await?)
    }
}

fn hasher() -> CredentialResult<Argon2<'static>> {
    let params = Params::new(15000, 2, 1, None)
        .map_err(|e| CredentialError::Hashing(anyhow::anyhow!(e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[tracing::instrument("Compute password hash", skip(password))]
fn compute_password_hash(password: Secret<String>) -> CredentialResult<Secret<String>> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = hasher()?
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| CredentialError::Hashing(anyhow::anyhow!(e)))?
        .to_string();
    Ok(Secret::new(password_hash))
}

/// `Ok(false)` on a mismatch, `Err` only when the stored hash is unusable
#[tracing::instrument("Verify password hash", skip(password, password_hash))]
fn verify_password_hash(
    password: Secret<String>,
    password_hash: Secret<String>,
) -> CredentialResult<bool> {
    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .map_err(|e| CredentialError::Hashing(anyhow::anyhow!(e)))?;

    match Argon2::default().verify_password(password.expose_secret().as_bytes(), &password_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hashing(anyhow::anyhow!(e))),
    }
}
