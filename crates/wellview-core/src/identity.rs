//! Identity types: backend user ids, report ids and the per-call identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Stable backend identifier for the signed-in user.
///
/// Issued by `POST /auth/sync-user` and sent on every authenticated call as
/// the caller-identity header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a user ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a user ID from a string
    pub fn from_string(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s.trim())
            .map_err(|e| Error::Parse(format!("Invalid user ID format: {}", e)))?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

/// Identity key of a weekly report; deletion matches on this by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn from_string(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid report ID format: {}", e)))?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

/// Credentials for one outbound call.
///
/// The token is fetched fresh for each call; the user id is fixed once the
/// session has resolved. Both must be present before anything is fetched,
/// which the type enforces by having no optional fields.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub session_token: String,
    pub backend_user_id: UserId,
}

impl Identity {
    pub fn new(session_token: impl Into<String>, backend_user_id: UserId) -> Self {
        Self {
            session_token: session_token.into(),
            backend_user_id,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.session_token)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("session_token", &"<redacted>")
            .field("backend_user_id", &self.backend_user_id)
            .finish()
    }
}
