//! Redirect-State Payload Codec
//!
//! The hosted sign-in page and this core hand intent to each other through a
//! single opaque query parameter named `state`: base64 over a small JSON
//! document. Outbound (towards the hosted page) the payload carries the
//! return destination; inbound (back from the hosted page) it carries the
//! one-time exchange token and, optionally, the destination again.
//!
//! The blob is opaque end to end. Query values are extracted and re-inserted
//! verbatim - in particular there is no `+`-as-space form decoding, which
//! would corrupt the standard base64 alphabet.

use crate::error::SessionError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Query parameter name carrying the encoded payload.
pub const STATE_PARAM: &str = "state";

/// Hosted page targeted by an outbound redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostedPage {
    SignIn,
    SignUp,
}

impl HostedPage {
    /// URL path segment on the hosted auth domain.
    pub fn path(&self) -> &'static str {
        match self {
            HostedPage::SignIn => "sign-in",
            HostedPage::SignUp => "sign-up",
        }
    }
}

impl fmt::Display for HostedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outbound payload: where the hosted page should send the user afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectIntent {
    /// Post-auth destination
    pub redirect_url: String,
    /// Page hint for hosted apps that render both flows on one route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<HostedPage>,
}

/// Inbound payload: what the hosted page sends back after authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundState {
    /// One-time custom token to exchange for a session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Destination the user originally asked for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Encodes a payload as base64(JSON).
///
/// The payload types serialize infallibly (strings and options only); an
/// empty blob is produced rather than panicking if that ever stops holding.
pub fn encode_state<T: Serialize>(payload: &T) -> String {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decodes a raw `state` query value.
///
/// # Errors
///
/// Returns [`SessionError::InvalidStatePayload`] for malformed base64 or
/// JSON. Callers treat that as "no state present".
pub fn decode_state<T: DeserializeOwned>(raw: &str) -> Result<T, SessionError> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| SessionError::InvalidStatePayload(format!("invalid base64: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| SessionError::InvalidStatePayload(format!("invalid JSON: {}", e)))
}

/// Extracts the raw `state` value from a page URL, if present.
///
/// The value is returned verbatim so base64 padding and alphabet survive.
pub fn extract_state_param(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let query = parsed.query()?;

    query.split('&').find_map(state_value).map(str::to_string)
}

/// Removes the `state` parameter from a page URL, preserving everything
/// else.
///
/// Returns the input unchanged when it does not parse; the caller has
/// already read it successfully, so that path is theoretical.
pub fn strip_state_param(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let remaining = parsed.query().map(|query| {
        query
            .split('&')
            .filter(|pair| state_value(pair).is_none() && *pair != STATE_PARAM)
            .collect::<Vec<_>>()
            .join("&")
    });

    match remaining.as_deref() {
        None | Some("") => parsed.set_query(None),
        Some(rest) => parsed.set_query(Some(rest)),
    }

    parsed.to_string()
}

fn state_value(pair: &str) -> Option<&str> {
    pair.strip_prefix(STATE_PARAM)?.strip_prefix('=')
}
