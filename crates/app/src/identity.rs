//! Shopper identities.
//!
//! Every cart and order belongs to exactly one identity: either an
//! authenticated user or an anonymous browsing session.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use serde::Serialize;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Marker for user identifiers issued by the external identity provider.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Length of freshly issued session keys.
pub const SESSION_KEY_LENGTH: usize = 32;

/// Longest session key accepted from callers.
pub const SESSION_KEY_MAX_LENGTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionKeyError {
    #[error("session key cannot be empty")]
    Empty,

    #[error("session key exceeds {SESSION_KEY_MAX_LENGTH} characters")]
    TooLong,

    #[error("session key may only contain ASCII letters and digits")]
    InvalidCharacter,
}

/// Anonymous session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Issue a new random session key.
    #[must_use]
    pub fn generate() -> Self {
        let key: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(SESSION_KEY_LENGTH)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();

        Self(key)
    }

    /// Validate a session key supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is empty, too long, or not alphanumeric.
    pub fn parse(value: &str) -> Result<Self, SessionKeyError> {
        if value.is_empty() {
            return Err(SessionKeyError::Empty);
        }

        if value.len() > SESSION_KEY_MAX_LENGTH {
            return Err(SessionKeyError::TooLong);
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SessionKeyError::InvalidCharacter);
        }

        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionKey {
    type Err = SessionKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// The owner of a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Identity {
    /// Authenticated user.
    User(UserUuid),

    /// Anonymous session.
    Session(SessionKey),
}

impl Identity {
    /// Split into the `(user_uuid, session_key)` column pair.
    pub(crate) fn columns(&self) -> (Option<uuid::Uuid>, Option<&str>) {
        match self {
            Self::User(user) => (Some(user.into_uuid()), None),
            Self::Session(key) => (None, Some(key.as_str())),
        }
    }

    /// Rebuild an identity from its column pair.
    pub(crate) fn from_columns(
        user_uuid: Option<uuid::Uuid>,
        session_key: Option<String>,
    ) -> Option<Self> {
        match (user_uuid, session_key) {
            (Some(user), None) => Some(Self::User(UserUuid::from_uuid(user))),
            (None, Some(key)) => Some(Self::Session(SessionKey(key))),
            _ => None,
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Session(key) => write!(f, "session:{key}"),
        }
    }
}
