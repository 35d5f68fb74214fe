//! # hrportal
//!
//! Session-gated administrative web portal.
//!
//! hrportal handles sign-in for an HR/ERP admin site: it issues signed
//! session cookies, checks them on every request, and keeps anonymous
//! visitors on the login page. You supply the pages (as an axum
//! [`Router`](axum::Router)) and a [`CredentialChecker`]; everything
//! behind them is gated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hrportal::prelude::*;
//! use axum::{Router, routing::get};
//!
//! # async fn run() -> Result<(), PortalError> {
//! let pages = Router::new().route("/", get(|| async { "dashboard" }));
//!
//! let server = PortalServer::builder()
//!     .config(PortalConfig::from_env()?)
//!     .pages(pages)
//!     .build(StaticCredentials::demo_admin())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod auth;
mod config;
mod error;
mod login;
mod server;

pub use auth::{CredentialChecker, StaticCredentials};
pub use config::{
    ENV_AUTH_SECRET, ENV_BIND, ENV_EMBED_EXPIRY, ENV_ENVIRONMENT, ENV_MAX_AGE,
    ENV_REMEMBER_MAX_AGE, Environment, MIN_PRODUCTION_SECRET_LEN, PortalConfig,
};
pub use error::{AuthError, ConfigError, PortalError};
pub use login::{
    LOGIN_PATH, LOGOUT_PATH, LoginForm, LoginQuery, MIN_PASSWORD_LEN, escape_html, login_page,
    login_submit, logout, render_login_page,
};
pub use server::{PortalServer, PortalServerBuilder, PortalState, build_router};

/// Everything an application needs in one import.
pub mod prelude {
    pub use crate::{
        AuthError, ConfigError, CredentialChecker, Environment, PortalConfig, PortalError,
        PortalServer, PortalServerBuilder, PortalState, StaticCredentials, build_router,
        escape_html,
    };
    pub use hrportal_gate::{AccessGate, ExemptionRules, GateDecision, GateState};
    pub use hrportal_session::{
        Role, SessionCodec, SessionCookieConfig, SessionError, SessionRecord, SessionSecret,
    };
}
