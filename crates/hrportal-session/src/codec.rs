//! Session codec: turns a [`SessionRecord`] into a tamper-evident token
//! and back.
//!
//! # Token format
//!
//! ```text
//! token     := payload "." signature
//! payload   := base64url_no_padding( UTF-8( JSON(record) ) )
//! signature := lowercase_hex( HMAC-SHA256(secret, payload) )
//! ```
//!
//! The signature covers the *encoded* payload bytes, exactly as they are
//! transmitted, so the JSON never needs to be canonicalized. The payload
//! is signed, not encrypted: anyone holding the cookie can read it.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use subtle::ConstantTimeEq;

use crate::{SessionError, SessionRecord, SessionSecret};

/// Upper bound on an accepted token. Browsers cap a cookie at about
/// 4 KiB, so anything longer did not come from us.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Encodes, signs, decodes and verifies session tokens under one secret.
///
/// The codec is read-only after construction. Clone it (or put it in an
/// `Arc`) to share it across request handlers; no locking is needed.
///
/// # Example
///
/// ```rust
/// use hrportal_session::{Role, SessionCodec, SessionRecord, SessionSecret};
///
/// let codec = SessionCodec::new(SessionSecret::new("s3cret").unwrap());
/// let record = SessionRecord::new("1", "Admin User", "admin@example.com", Role::Admin);
///
/// let token = codec.encode(&record);
/// assert_eq!(codec.decode(&token), Some(record));
/// assert_eq!(codec.decode("garbage"), None);
/// ```
#[derive(Debug, Clone)]
pub struct SessionCodec {
    secret: SessionSecret,
}

impl SessionCodec {
    pub fn new(secret: SessionSecret) -> Self {
        Self { secret }
    }

    /// Serializes and signs a record.
    ///
    /// # Panics
    ///
    /// Never in practice: a record is strings, a unit-variant enum and an
    /// optional integer, none of which `serde_json` can fail to serialize.
    pub fn encode(&self, record: &SessionRecord) -> String {
        let json = serde_json::to_vec(record).expect("session record serializes to JSON");
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.secret.sign_hex(payload.as_bytes());
        format!("{payload}.{signature}")
    }

    /// Decodes a token, collapsing every failure to `None`.
    ///
    /// This is what request gating should use: a missing, corrupt,
    /// tampered or expired token all mean "no session".
    pub fn decode(&self, token: &str) -> Option<SessionRecord> {
        match self.verify(token) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }

    /// Decodes a token and reports why it was rejected.
    ///
    /// The reason is for logs and tests only; don't show it to users.
    pub fn verify(&self, token: &str) -> Result<SessionRecord, SessionError> {
        self.verify_at(token, unix_now())
    }

    /// Like [`verify`](Self::verify), with an explicit clock (unix seconds).
    pub fn verify_at(&self, token: &str, now_unix: u64) -> Result<SessionRecord, SessionError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(SessionError::MalformedToken(format!(
                "token exceeds {MAX_TOKEN_LEN} bytes"
            )));
        }

        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| SessionError::MalformedToken("missing separator".into()))?;
        if payload.is_empty() || signature.is_empty() {
            return Err(SessionError::MalformedToken("empty payload or signature".into()));
        }

        let expected = self.secret.sign_hex(payload.as_bytes());
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(SessionError::SignatureMismatch);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SessionError::MalformedToken(format!("payload encoding: {e}")))?;
        let record: SessionRecord = serde_json::from_slice(&json)
            .map_err(|e| SessionError::MalformedToken(format!("payload json: {e}")))?;

        if record.is_expired_at(now_unix) {
            return Err(SessionError::Expired);
        }
        Ok(record)
    }
}

/// Encodes `record` under `secret`. Shorthand for a one-off
/// [`SessionCodec::encode`].
pub fn encode(record: &SessionRecord, secret: &SessionSecret) -> String {
    SessionCodec::new(secret.clone()).encode(record)
}

/// Decodes `token` under `secret`; `None` means "no session".
pub fn decode(token: &str, secret: &SessionSecret) -> Option<SessionRecord> {
    SessionCodec::new(secret.clone()).decode(token)
}

/// Seconds since the unix epoch. A clock set before 1970 reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
