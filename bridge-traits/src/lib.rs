//! # Host Bridge Traits
//!
//! Capability traits that must be implemented by each embedding host.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and the
//! environment it runs in. The core performs no authentication work of its
//! own: token issuance, credential verification and session persistence all
//! live behind the [`IdentityBridge`](identity::IdentityBridge), and every
//! interaction with the visible URL goes through the
//! [`Navigator`](navigation::Navigator). Hosts (a browser shell, a webview
//! wrapper, a test harness) supply concrete adapters for both.
//!
//! ## Traits
//!
//! - [`IdentityBridge`](identity::IdentityBridge) - custom-token exchange,
//!   auth-state subscription, sign-out
//! - [`Navigator`](navigation::Navigator) - current URL, in-place URL
//!   rewriting, full-page navigation
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Adapters should convert host-specific failures into `BridgeError` with
//! actionable messages; the core maps them into its own error taxonomy.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so the core can share
//! adapters across async tasks via `Arc<dyn Trait>`.

pub mod error;
pub mod identity;
pub mod navigation;

pub use error::BridgeError;

// Re-export commonly used types
pub use identity::{AuthStateSubscription, AuthUser, IdentityBridge};
pub use navigation::Navigator;
