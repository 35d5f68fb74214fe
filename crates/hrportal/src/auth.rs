//! Credential check hook.
//!
//! hrportal doesn't decide who may sign in; that belongs to your user
//! directory (LDAP, a database, an identity provider). The login action
//! calls a [`CredentialChecker`] and issues a session token if and only
//! if the checker returns a [`SessionRecord`].

use hrportal_session::{Role, SessionRecord};
use subtle::ConstantTimeEq;

use crate::AuthError;

/// Verifies an email/password pair and says who the user is.
///
/// # Trait bounds
///
/// - `Send + Sync` → one checker is shared by every request task.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use hrportal::{AuthError, CredentialChecker};
/// use hrportal_session::{Role, SessionRecord};
///
/// /// Lets exactly one hard-coded HR user in.
/// struct OneUser;
///
/// impl CredentialChecker for OneUser {
///     async fn check(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
///         if email == "hr@corp.example" && password == "correct horse" {
///             Ok(SessionRecord::new("7", "HR Desk", email, Role::Hr))
///         } else {
///             Err(AuthError::InvalidCredentials)
///         }
///     }
/// }
/// ```
pub trait CredentialChecker: Send + Sync + 'static {
    /// Checks the credentials.
    ///
    /// # Returns
    /// - `Ok(SessionRecord)` — sign-in succeeded; this is who they are
    /// - `Err(AuthError::InvalidCredentials)` — wrong email or password
    /// - `Err(AuthError::Unavailable)` — the backing store couldn't answer
    fn check(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<SessionRecord, AuthError>> + Send;
}

/// A single shared-password account.
///
/// Any well-formed email that arrives with the configured password signs
/// in as the configured principal, with the submitted email carried into
/// the session. Intended for demos and local development.
#[derive(Clone)]
pub struct StaticCredentials {
    password: String,
    id: String,
    name: String,
    role: Role,
}

impl StaticCredentials {
    pub fn new(
        password: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            password: password.into(),
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// The demo administrator: password `admin123`, id `1`, "Admin User".
    pub fn demo_admin() -> Self {
        Self::new("admin123", "1", "Admin User", Role::Admin)
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl CredentialChecker for StaticCredentials {
    async fn check(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
        if !bool::from(password.as_bytes().ct_eq(self.password.as_bytes())) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(SessionRecord::new(
            self.id.clone(),
            self.name.clone(),
            email,
            self.role,
        ))
    }
}
