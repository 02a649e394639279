//! Account-level identity values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Email used when no valid login record is stored.
pub const GUEST_EMAIL: &str = "guest";

/// The record persisted under the `user` key after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub email: String,
    pub role: String,
}

/// The account a session is scoped to.
///
/// Resolved once when a session is constructed and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountIdentity {
    email: String,
}

impl AccountIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn guest() -> Self {
        Self::new(GUEST_EMAIL)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_guest(&self) -> bool {
        self.email == GUEST_EMAIL
    }
}

impl From<&SessionRecord> for AccountIdentity {
    fn from(record: &SessionRecord) -> Self {
        Self::new(record.email.clone())
    }
}

impl fmt::Display for AccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Opaque, durable identifier of a (device, account) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInstanceId(String);

impl UserInstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
