//! Error types for the hrportal application layer.

use axum::http::StatusCode;
use hrportal_session::SessionError;

/// Problems found while loading configuration. All of them stop startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Production refuses to run without an explicit signing secret.
    #[error("AUTH_SECRET must be set when PORTAL_ENV={environment}")]
    MissingSecret { environment: String },

    /// The secret is a known default or too short to sign with in production.
    #[error("AUTH_SECRET is too weak for production: {reason}")]
    WeakSecret { reason: &'static str },

    /// An environment value couldn't be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// The secret was rejected by the session layer.
    #[error(transparent)]
    Secret(#[from] SessionError),
}

/// Why a sign-in attempt failed.
///
/// The `Display` text goes to logs. Users only ever see
/// [`user_message`](Self::user_message), which is deliberately vague.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The form didn't pass validation (bad email shape, short password).
    #[error("login form failed validation: {0}")]
    InvalidInput(&'static str),

    /// The credential check said no.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The credential backend couldn't answer.
    #[error("credential check unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// The message shown on the login page.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "Invalid credentials",
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::Unavailable(_) => "Sign-in is temporarily unavailable",
        }
    }

    /// HTTP status for the re-rendered login page.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Errors that stop the server from starting or serving.
///
/// Session and sign-in failures never get here: the gate and the login
/// action turn them into redirects and re-rendered pages.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving the listener failed.
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_from_session_error() {
        let err: PortalError = ConfigError::from(SessionError::InvalidSecret("empty key")).into();
        assert!(matches!(err, PortalError::Config(ConfigError::Secret(_))));
        assert_eq!(err.to_string(), "invalid session secret: empty key");
    }

    #[test]
    fn test_from_config_error() {
        let err: PortalError = ConfigError::MissingSecret {
            environment: "production".into(),
        }
        .into();
        assert!(matches!(err, PortalError::Config(_)));
        assert!(err.to_string().contains("AUTH_SECRET"));
    }

    #[test]
    fn test_from_io_error() {
        let err: PortalError = std::io::Error::other("port taken").into();
        assert!(matches!(err, PortalError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn test_auth_error_user_messages_are_fixed() {
        assert_eq!(
            AuthError::InvalidInput("email").user_message(),
            "Invalid credentials"
        );
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::Unavailable("db down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
