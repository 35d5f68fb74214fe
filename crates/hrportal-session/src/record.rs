//! The session record: who is signed in.
//!
//! A record is what gets serialized into the token payload. It carries
//! just enough to render UI chrome (name, email) and to make future
//! authorization decisions (role) without a database round trip.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The closed set of roles a principal can hold.
///
/// Serialized lowercase (`"admin"`, `"hr"`, `"staff"`). A payload with any
/// other role string fails to parse, which makes the whole token invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Staff,
}

impl Role {
    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// An authenticated principal, as carried inside a session token.
///
/// Records are immutable once issued: there are no setters. A new login
/// builds a new record (and therefore a new token).
///
/// The JSON field order is `id`, `name`, `email`, `role`, which is the
/// order serde emits struct fields in. When `expires_at` is `None` the
/// `exp` key is left out entirely, so the payload matches tokens issued
/// by deployments that never embedded an expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    id: String,
    name: String,
    email: String,
    role: Role,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

impl SessionRecord {
    /// Builds a record with no embedded expiry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            expires_at: None,
        }
    }

    /// Returns a copy of this record that expires at `unix_secs`.
    ///
    /// Consumes `self` so the original can't be mutated in place.
    pub fn expiring_at(self, unix_secs: u64) -> Self {
        Self {
            expires_at: Some(unix_secs),
            ..self
        }
    }

    /// Opaque identifier of the principal.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact address.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Unix timestamp (seconds) after which the record is no longer valid,
    /// if one was embedded at issuance.
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Whether the embedded expiry (if any) has passed at `now_unix`.
    pub fn is_expired_at(&self, now_unix: u64) -> bool {
        self.expires_at.is_some_and(|exp| now_unix >= exp)
    }
}
