//! # Hosted-SSO Session Core
//!
//! Client-side coordinator for a hosted single-sign-on flow. The embedding
//! application injects two host bridges (the external identity SDK and a
//! navigation surface) and gets back a small, observable session:
//!
//! - inbound `state` handling and one-time token exchange on startup,
//! - a `{ loading, user }` session snapshot behind a watch channel,
//! - hosted sign-in/sign-up redirect construction and sign-out.
//!
//! ```ignore
//! use core_session::{RedirectOptions, SessionConfig, SessionCoordinator};
//! use std::sync::Arc;
//!
//! let config = SessionConfig::builder()
//!     .domain("app.example.com")
//!     .redirect_url("https://host.example/")
//!     .identity(Arc::new(MySdkBridge::new()))
//!     .navigator(Arc::new(BrowserNavigator::new()))
//!     .build()?;
//!
//! let coordinator = SessionCoordinator::start(config).await;
//! if !coordinator.is_authenticated() {
//!     coordinator.login_with_redirect(&RedirectOptions::default())?;
//! }
//! ```

pub mod coordinator;
pub mod error;
pub mod hosted;
pub mod state;

pub use coordinator::{SessionCoordinator, SessionState};
pub use error::{Result, SessionError};
pub use hosted::{HostedUrls, LogoutOptions, RedirectOptions};
pub use state::{HostedPage, InboundState, RedirectIntent};

// Re-exported so embedders depend on this crate alone.
pub use bridge_traits::{AuthStateSubscription, AuthUser, BridgeError, IdentityBridge, Navigator};
pub use core_runtime::config::{SessionConfig, SessionConfigBuilder};
pub use core_runtime::events::{EventBus, EventStream, SessionEvent};
