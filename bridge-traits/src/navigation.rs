//! Navigation Bridge
//!
//! Abstracts the host's URL and navigation surface so the core never touches
//! browser globals directly. A browser host maps these onto `location` and
//! `history.replaceState`; a test harness records them.

use crate::error::Result;

/// Host navigation capabilities.
///
/// All three operations are synchronous: inspecting or rewriting the visible
/// URL has no await point on any supported host.
pub trait Navigator: Send + Sync {
    /// Returns the full URL of the current page, including the query string.
    fn current_url(&self) -> Result<String>;

    /// Rewrites the visible URL in place, without reloading the page and
    /// without adding a history entry.
    ///
    /// Used to strip a consumed `state` parameter so it cannot be replayed
    /// by a refresh or a copied link.
    fn replace_url(&self, url: &str) -> Result<()>;

    /// Navigates to `url` as a full page replacement (no history entry).
    fn navigate(&self, url: &str) -> Result<()>;
}
