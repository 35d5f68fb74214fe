//! Error types for the session layer.

/// Reasons a session token can be rejected.
///
/// These exist for logging and tests. Callers that gate requests
/// collapse every variant into the same outcome, "no session", so the
/// user never learns why a cookie was refused. See
/// [`SessionCodec::decode`](crate::SessionCodec::decode).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The token could not be taken apart: no `.` separator, an empty
    /// half, bad base64, or a payload that isn't a session record.
    #[error("malformed session token: {0}")]
    MalformedToken(String),

    /// The signature doesn't match the HMAC of the payload under our
    /// secret. Either the payload was edited or it was signed with a
    /// different key.
    #[error("session signature mismatch")]
    SignatureMismatch,

    /// The payload carries an expiry timestamp that has passed.
    #[error("session expired")]
    Expired,

    /// The request carried no session cookie at all.
    #[error("no session cookie")]
    MissingCookie,

    /// The signing secret was rejected (empty, or refused by the MAC).
    #[error("invalid session secret: {0}")]
    InvalidSecret(&'static str),
}
