use thiserror::Error;

/// Errors returned to callers of the session coordinator.
///
/// Token-exchange failures never appear here: inbound handling is fail-open
/// and surfaces them as events only.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Malformed state payload: {0}")]
    InvalidStatePayload(String),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
