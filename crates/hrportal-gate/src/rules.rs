//! Which request paths bypass the gate entirely.
//!
//! Exemptions are data, not branching: a list of prefixes, a list of
//! exact public paths, and a switch for "looks like a file". That keeps
//! them testable on their own and configurable per deployment.

/// Route-exemption configuration.
#[derive(Debug, Clone)]
pub struct ExemptionRules {
    /// Path prefixes that are never gated (static bundles, APIs, public
    /// assets). Matched with `str::starts_with`.
    pub prefixes: Vec<String>,

    /// Exact paths that anyone may view.
    pub public_paths: Vec<String>,

    /// Exempt any path whose last segment contains a `.`, e.g.
    /// `/favicon.ico` or `/img/logo.png`.
    pub exempt_file_extensions: bool,
}

impl Default for ExemptionRules {
    fn default() -> Self {
        Self {
            prefixes: ["/_next", "/api", "/public", "/assets"]
                .into_iter()
                .map(String::from)
                .collect(),
            public_paths: Vec::new(),
            exempt_file_extensions: true,
        }
    }
}

impl ExemptionRules {
    /// No exemptions at all: every path is gated.
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
            public_paths: Vec::new(),
            exempt_file_extensions: false,
        }
    }

    /// Adds a prefix exemption.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Adds an exact public path.
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.push(path.into());
        self
    }

    /// Whether `path` skips authentication regardless of session state.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.public_paths.iter().any(|p| p == path)
            || (self.exempt_file_extensions && has_file_extension(path))
    }
}

/// `true` when the final path segment contains a dot.
fn has_file_extension(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}
