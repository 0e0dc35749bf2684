//! Workspace facade crate.
//!
//! Re-exports the session coordinator surface so host applications can depend
//! on `sso-workspace` alone instead of wiring the individual member crates
//! (`bridge-traits`, `core-runtime`, `core-session`) themselves.

pub use core_session::*;
