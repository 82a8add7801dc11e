//! Outbound API surface consumed by tenant handlers
//!
//! The runtime implements [`Outbound`]; tenant code only ever sees it through
//! the control facade handed into each callback. All sends are best-effort
//! and fire-and-forget: callers must not assume delivery.

use crate::errors::{ApiError, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum characters of a tenant log line before truncation
pub const MAX_LOG_LINE: usize = 400;

/// Maximum length of a backend name
pub const MAX_NAME_LEN: usize = 16;

// ----------------------------------------------------------------------------
// Outbound Trait
// ----------------------------------------------------------------------------

/// Operations a tenant handler may invoke against the runtime
pub trait Outbound {
    /// Send a message to every subscribed frontend over the broadcast
    /// endpoint. Returns as soon as the message is queued; no acknowledgment,
    /// no backpressure.
    fn broadcast(&mut self, message: &str) -> Result<()>;

    /// Send an async message to a single frontend over the reply endpoint.
    /// Same best-effort semantics as `broadcast`.
    fn notify(&mut self, identity: &str, message: &str) -> Result<()>;

    /// Write a line to the backend's logging sink, prefixed with the current
    /// tick count and truncated to [`MAX_LOG_LINE`] characters
    fn log(&mut self, message: &str);

    /// Name this backend for log readability.
    ///
    /// Must be 1 to 16 characters drawn from `[A-Za-z0-9_-]`.
    fn set_name(&mut self, name: &str) -> Result<()>;
}

/// Check a backend name against the allowed format
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ApiError::InvalidName(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HearthError;

    #[test]
    fn accepts_alphanumeric_names() {
        assert!(validate_name("example_backend").is_ok());
        assert!(validate_name("a").is_ok());
        assert!(validate_name("six-teen_chars_x").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "seventeen-chars-x", "has space", "dots.too", "ünïcode"] {
            let err = validate_name(bad).unwrap_err();
            assert!(matches!(err, HearthError::Api(ApiError::InvalidName(_))));
        }
    }
}
