//! # Session Configuration Module
//!
//! Provides configuration management for the session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SessionConfig` instance holding the hosted auth settings and the host
//! bridges the coordinator needs. It enforces fail-fast validation so a
//! misconfigured embedding is rejected at startup rather than at the first
//! redirect.
//!
//! ## Required Dependencies
//!
//! - `IdentityBridge` - wraps the external identity SDK
//! - `Navigator` - wraps the host's URL/navigation surface
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SessionConfig;
//! use std::sync::Arc;
//!
//! let config = SessionConfig::builder()
//!     .domain("app.example.com")
//!     .redirect_url("https://host.example/")
//!     .identity(Arc::new(MySdkBridge::new()))
//!     .navigator(Arc::new(BrowserNavigator::new()))
//!     .build()
//!     .expect("Failed to build config");
//!
//! // Optional: let the coordinator's `debug` flag drive log verbosity.
//! core_runtime::logging::init_logging(config.logging_config())?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::logging::LoggingConfig;
use bridge_traits::{IdentityBridge, Navigator};
use std::sync::Arc;
use url::Url;

/// Configuration for the session coordinator.
///
/// Use [`SessionConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SessionConfig {
    /// Hosted auth service host, without scheme (e.g. `app.example.com`)
    pub domain: String,

    /// Default post-auth destination encoded into outbound state payloads
    pub redirect_url: String,

    /// External identity SDK bridge (required)
    pub identity: Arc<dyn IdentityBridge>,

    /// Host navigation bridge (required)
    pub navigator: Arc<dyn Navigator>,

    /// Enables verbose coordinator logging
    pub debug: bool,

    /// Buffer size for the coordinator's event bus
    pub event_buffer: usize,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("domain", &self.domain)
            .field("redirect_url", &self.redirect_url)
            .field("identity", &"IdentityBridge { ... }")
            .field("navigator", &"Navigator { ... }")
            .field("debug", &self.debug)
            .field("event_buffer", &self.event_buffer)
            .finish()
    }
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Logging preset for this configuration: verbose when `debug` is set.
    ///
    /// Hosts that let the coordinator own stdout pass this to
    /// [`init_logging`](crate::logging::init_logging); embedders with their
    /// own subscriber can ignore it.
    pub fn logging_config(&self) -> LoggingConfig {
        if self.debug {
            LoggingConfig::verbose()
        } else {
            LoggingConfig::default()
        }
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The domain is a bare, non-empty host (no scheme, no path)
    /// - The default redirect URL parses as an absolute URL
    /// - The event buffer is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(Error::Config("Auth domain cannot be empty".to_string()));
        }

        if self.domain.contains("://") {
            return Err(Error::Config(format!(
                "Auth domain must be a bare host without scheme, got '{}'",
                self.domain
            )));
        }

        if self.domain.contains('/') || self.domain.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "Auth domain must not contain a path or whitespace, got '{}'",
                self.domain
            )));
        }

        Url::parse(&self.redirect_url).map_err(|e| {
            Error::Config(format!(
                "Default redirect URL '{}' is not a valid absolute URL: {}",
                self.redirect_url, e
            ))
        })?;

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn identity_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "IdentityBridge".to_string(),
        message: "An IdentityBridge implementation is required for token exchange and \
                 auth-state observation. Wrap your identity provider's client SDK and \
                 inject it with .identity()."
            .to_string(),
    }
}

fn navigator_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "Navigator".to_string(),
        message: "A Navigator implementation is required for redirect handoff. \
                 Browser hosts: adapt location/history. Tests: inject a recording fake. \
                 Inject it with .navigator()."
            .to_string(),
    }
}

/// Builder for constructing [`SessionConfig`] instances.
///
/// Validates required dependencies and produces actionable error messages
/// when something is missing.
#[derive(Default)]
pub struct SessionConfigBuilder {
    domain: Option<String>,
    redirect_url: Option<String>,
    identity: Option<Arc<dyn IdentityBridge>>,
    navigator: Option<Arc<dyn Navigator>>,
    debug: bool,
    event_buffer: Option<usize>,
}

impl SessionConfigBuilder {
    /// Sets the hosted auth service host (e.g. `app.example.com`).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the default post-auth destination.
    ///
    /// Outbound redirect URLs encode this destination whenever the caller
    /// does not supply an override.
    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Sets the identity SDK bridge (required).
    pub fn identity(mut self, identity: Arc<dyn IdentityBridge>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the navigation bridge (required).
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Enables or disables verbose coordinator logging.
    ///
    /// Default: false
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Sets the event bus buffer size.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Builds the final `SessionConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns an error if required bridges are missing or configuration
    /// values are invalid.
    pub fn build(self) -> Result<SessionConfig> {
        let domain = self.domain.ok_or_else(|| {
            Error::Config("Auth domain is required. Use .domain() to set it.".to_string())
        })?;

        let redirect_url = self.redirect_url.ok_or_else(|| {
            Error::Config(
                "Default redirect URL is required. Use .redirect_url() to set it.".to_string(),
            )
        })?;

        let identity = self.identity.ok_or_else(identity_missing_error)?;
        let navigator = self.navigator.ok_or_else(navigator_missing_error)?;

        let config = SessionConfig {
            domain,
            redirect_url,
            identity,
            navigator,
            debug: self.debug,
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
