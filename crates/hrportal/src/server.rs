//! `PortalServer` builder and serve loop.
//!
//! This is the entry point for running the portal. It ties the layers
//! together: config → session codec → access gate → login routes + your
//! pages.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use hrportal_gate::{AccessGate, ExemptionRules, protect};
use hrportal_session::{SessionCodec, SessionCookieConfig};
use tokio::net::TcpListener;

use crate::login::{LOGIN_PATH, LOGOUT_PATH, login_page, login_submit, logout};
use crate::{ConfigError, CredentialChecker, PortalConfig, PortalError};

/// Shared state handed to the login/logout handlers.
///
/// Built once at startup and read-only afterwards; wrapped in `Arc` so
/// every request task gets a cheap handle.
pub struct PortalState<C: CredentialChecker> {
    pub(crate) gate: Arc<AccessGate>,
    pub(crate) cookies: SessionCookieConfig,
    pub(crate) checker: C,
    pub(crate) embed_expiry: bool,
}

impl<C: CredentialChecker> PortalState<C> {
    /// Resolves the secret and assembles the gate from `config`.
    ///
    /// The gate exempts `/logout`, so a stale cookie can be cleared without
    /// first proving the session is valid.
    ///
    /// # Errors
    /// Fails if the secret can't be resolved (see
    /// [`PortalConfig::resolve_secret`]).
    pub fn from_config(
        config: &PortalConfig,
        rules: ExemptionRules,
        checker: C,
    ) -> Result<Self, ConfigError> {
        let cookies = config.cookie_config();
        let codec = SessionCodec::new(config.resolve_secret()?);
        let gate = AccessGate::new(codec, rules)
            .login_path(LOGIN_PATH)
            .logout_path(LOGOUT_PATH)
            .cookie_name(cookies.name.clone());

        Ok(Self {
            gate: Arc::new(gate),
            cookies,
            checker,
            embed_expiry: config.embed_expiry,
        })
    }

    /// The gate guarding every route.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn cookies(&self) -> &SessionCookieConfig {
        &self.cookies
    }
}

/// Builds the full application router: `pages` plus the login and logout
/// routes, all behind the access gate.
///
/// The gate wraps the merged router, fallback included, so no page code
/// runs for a request the gate turns away.
pub fn build_router<C: CredentialChecker>(state: Arc<PortalState<C>>, pages: Router) -> Router {
    let auth_routes = Router::new()
        .route(LOGIN_PATH, get(login_page).post(login_submit::<C>))
        .route(LOGOUT_PATH, get(logout::<C>).post(logout::<C>))
        .with_state(Arc::clone(&state));

    protect(pages.merge(auth_routes), Arc::clone(&state.gate))
}

/// Builder for configuring and starting a portal server.
///
/// # Example
///
/// ```rust,ignore
/// use hrportal::prelude::*;
///
/// let server = PortalServer::builder()
///     .config(PortalConfig::from_env()?)
///     .pages(my_pages)
///     .build(StaticCredentials::demo_admin())
///     .await?;
/// server.run().await
/// ```
pub struct PortalServerBuilder {
    bind_addr: Option<String>,
    config: PortalConfig,
    rules: ExemptionRules,
    pages: Router,
}

impl PortalServerBuilder {
    /// Creates a builder with default config, default exemptions and no pages.
    pub fn new() -> Self {
        Self {
            bind_addr: None,
            config: PortalConfig::default(),
            rules: ExemptionRules::default(),
            pages: Router::new(),
        }
    }

    /// Overrides the bind address from the config.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    pub fn config(mut self, config: PortalConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets which paths skip the gate.
    pub fn exemptions(mut self, rules: ExemptionRules) -> Self {
        self.rules = rules;
        self
    }

    /// The application's own pages. All of them end up behind the gate.
    pub fn pages(mut self, pages: Router) -> Self {
        self.pages = pages;
        self
    }

    /// Resolves configuration, binds the listener and assembles the router.
    ///
    /// # Errors
    /// - [`PortalError::Config`] — e.g. production without `AUTH_SECRET`
    /// - [`PortalError::Io`] — the address couldn't be bound
    pub async fn build<C: CredentialChecker>(
        self,
        checker: C,
    ) -> Result<PortalServer, PortalError> {
        let state = Arc::new(PortalState::from_config(&self.config, self.rules, checker)?);
        let router = build_router(state, self.pages);

        let addr = self.bind_addr.unwrap_or(self.config.bind_addr);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(
            addr = %addr,
            environment = %self.config.environment,
            "portal listening"
        );

        Ok(PortalServer { listener, router })
    }
}

impl Default for PortalServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run portal server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct PortalServer {
    listener: TcpListener,
    router: Router,
}

impl PortalServer {
    pub fn builder() -> PortalServerBuilder {
        PortalServerBuilder::new()
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle to the assembled router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serves until the process is terminated.
    pub async fn run(self) -> Result<(), PortalError> {
        tracing::info!("portal server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Serves until `signal` resolves, then stops accepting connections
    /// and lets in-flight requests finish.
    pub async fn run_until<F>(self, signal: F) -> Result<(), PortalError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("portal server running");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;
        tracing::info!("portal server stopped");
        Ok(())
    }
}
