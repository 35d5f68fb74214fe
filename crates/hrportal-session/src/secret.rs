//! The server-wide signing secret.

use std::fmt;

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::SessionError;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Length of a generated development secret, in bytes.
const GENERATED_SECRET_LEN: usize = 32;

/// The HMAC-SHA256 key used to sign and verify session tokens.
///
/// The key is loaded once at startup and never mutated. Internally we
/// keep an already-keyed MAC and clone it for every signature, so the
/// key schedule runs once instead of on every request.
///
/// `Debug` is implemented by hand so key material never reaches a log line.
#[derive(Clone)]
pub struct SessionSecret {
    mac: HmacSha256,
}

impl SessionSecret {
    /// Wraps raw key bytes.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidSecret`] if `key` is empty.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, SessionError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(SessionError::InvalidSecret("secret is empty"));
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|_| SessionError::InvalidSecret("rejected key length"))?;
        Ok(Self { mac })
    }

    /// Generates a random 256-bit secret.
    ///
    /// Tokens signed with it stop verifying as soon as the process exits,
    /// so this is only suitable for local development.
    pub fn generate() -> Self {
        let mut key = [0u8; GENERATED_SECRET_LEN];
        rand::rng().fill(&mut key[..]);
        Self {
            mac: HmacSha256::new_from_slice(&key).expect("non-empty HMAC key is accepted"),
        }
    }

    /// `HMAC-SHA256(secret, data)` as lowercase hex.
    pub(crate) fn sign_hex(&self, data: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(<redacted>)")
    }
}
