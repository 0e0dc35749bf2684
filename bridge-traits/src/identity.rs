//! Identity SDK Bridge
//!
//! Abstracts the external identity provider's client SDK behind three
//! capabilities: custom-token exchange, auth-state observation and sign-out.
//! The SDK's internals (token refresh, credential storage, transport) are
//! deliberately out of scope; the core only ever sees the session principal
//! it publishes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// The session principal as reported by the external SDK.
///
/// The core treats this as an opaque pass-through: `uid` identifies the
/// principal, everything else the SDK attaches travels in `claims`
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable identifier assigned by the identity provider
    pub uid: String,
    /// Display name, if the provider exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Primary email address, if the provider exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Provider-specific profile data, passed through verbatim
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub claims: Value,
}

impl AuthUser {
    /// Creates a principal with only a `uid` set.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            claims: Value::Null,
        }
    }
}

/// A live subscription to the SDK's auth-state stream.
///
/// The SDK delivers `Some(user)` on sign-in and session restore, `None` on
/// sign-out, and must deliver the current state once shortly after the
/// subscription is created (the "initial determination"). The handle is the
/// scoped resource: calling [`close`](AuthStateSubscription::close) or
/// dropping it releases the underlying SDK listener.
#[derive(Debug)]
pub struct AuthStateSubscription {
    receiver: mpsc::UnboundedReceiver<Option<AuthUser>>,
}

impl AuthStateSubscription {
    /// Wraps a channel receiver fed by the SDK adapter.
    pub fn new(receiver: mpsc::UnboundedReceiver<Option<AuthUser>>) -> Self {
        Self { receiver }
    }

    /// Waits for the next auth-state change.
    ///
    /// Returns `None` once the SDK side has dropped its sender (adapter torn
    /// down), after which no further events will arrive.
    pub async fn recv(&mut self) -> Option<Option<AuthUser>> {
        self.receiver.recv().await
    }

    /// Releases the subscription.
    ///
    /// Events already queued may still be drained with
    /// [`recv`](AuthStateSubscription::recv); no new events are accepted.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// External identity SDK capabilities required by the session core.
///
/// Implementations wrap the vendor SDK (or a test double). All real
/// authentication work happens behind this trait.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::{AuthStateSubscription, AuthUser, IdentityBridge};
/// use bridge_traits::error::Result;
///
/// struct VendorSdkBridge { /* vendor client handle */ }
///
/// #[async_trait::async_trait]
/// impl IdentityBridge for VendorSdkBridge {
///     async fn sign_in_with_token(&self, token: &str) -> Result<AuthUser> {
///         // forward to the vendor SDK's custom-token sign-in
///         todo!()
///     }
///
///     fn subscribe_auth_state(&self) -> AuthStateSubscription {
///         // register an SDK listener that forwards into the channel
///         todo!()
///     }
///
///     async fn sign_out(&self) -> Result<()> {
///         todo!()
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait IdentityBridge: Send + Sync {
    /// Exchanges a one-time custom token for an authenticated session.
    ///
    /// The token is an opaque credential minted by the hosted sign-in page;
    /// the SDK is expected to reject a replayed or expired token.
    async fn sign_in_with_token(&self, token: &str) -> Result<AuthUser>;

    /// Subscribes to auth-state changes.
    ///
    /// Adapters must push the current state once after registration and on
    /// every subsequent change (sign-in, sign-out, session restore).
    fn subscribe_auth_state(&self) -> AuthStateSubscription;

    /// Terminates the current session.
    async fn sign_out(&self) -> Result<()>;
}
