//! Signed session tokens for hrportal.
//!
//! This crate is the leaf of the stack. It knows how to:
//!
//! 1. **Describe a principal** — [`SessionRecord`] and its [`Role`]
//! 2. **Sign and verify** — [`SessionCodec`] turns a record into a
//!    `payload.signature` token and back, keyed by a [`SessionSecret`]
//! 3. **Carry the token** — [`SessionCookieConfig`] builds the `HttpOnly`
//!    cookie and [`find_session_token`] pulls it out of request headers
//!
//! It has no HTTP framework dependency; the gate crate above wires it
//! into request handling.
//!
//! # How it fits in the stack
//!
//! ```text
//! hrportal (login/logout, server)      ← issues and clears tokens
//!     ↕
//! hrportal-gate                        ← validates tokens on every request
//!     ↕
//! hrportal-session (this crate)        ← token format, signing, cookies
//! ```

mod codec;
mod cookies;
mod error;
mod record;
mod secret;

pub use codec::{MAX_TOKEN_LEN, SessionCodec, decode, encode, unix_now};
pub use cookies::{
    DEFAULT_MAX_AGE_SECS, REMEMBER_MAX_AGE_SECS, SESSION_COOKIE_NAME, SessionCookieConfig,
    find_session_token,
};
pub use error::SessionError;
pub use record::{Role, SessionRecord};
pub use secret::SessionSecret;

pub use cookie::{Cookie, SameSite};
