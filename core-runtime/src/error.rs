//! Runtime error types.
//!
//! Everything here is a startup-time failure: a bad configuration value or a
//! host bridge the embedder forgot to inject. Once a coordinator is running,
//! failures flow through the session crate's own error type instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is missing or invalid.
    #[error("Invalid session configuration: {0}")]
    Config(String),

    /// A required host bridge was not injected.
    ///
    /// The message names the builder method to call.
    #[error("Missing host capability: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
