//! Error types for the Hearth backend runtime
//!
//! Errors are grouped by concern (codec, registry, transport, tenant API)
//! and unified into the top-level [`HearthError`]. The split mirrors the
//! failure taxonomy of the runtime: fatal startup errors, protocol errors
//! that are logged and dropped, and API misuse errors returned straight to
//! tenant code.

use crate::types::HandleId;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Envelope codec failures
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Bytes could not be parsed into the envelope schema
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A sub-record value exceeds the maximum field size (hard reject, never truncated)
    #[error("oversize field: {size} bytes (max: {max})")]
    OversizeField { size: usize, max: usize },
}

impl CodecError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope(reason.into())
    }
}

/// Event registry failures
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tenant cannot register more than one frontend handler")]
    DuplicateFrontend,

    #[error("tenant failed to register a frontend handler")]
    MissingFrontend,

    #[error("cannot unregister from the frontend event source")]
    CannotClearFrontend,

    #[error("unknown timer id: {0}")]
    UnknownTimer(HandleId),

    #[error("timer interval must be greater than zero")]
    InvalidInterval,
}

/// Transport bootstrap and socket failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Credential file missing, unreadable, or malformed (fatal at startup)
    #[error("bad credential file {path}: {reason}")]
    Credential { path: String, reason: String },

    #[error("failed to bind {endpoint}: {reason}")]
    Bind { endpoint: String, reason: String },

    #[error("socket error: {0}")]
    Socket(String),

    /// Inbound routing frame was not valid UTF-8
    #[error("identity frame is not valid UTF-8 ({len} bytes)")]
    BadIdentityFrame { len: usize },

    #[error("transport is closed")]
    Closed,
}

/// Tenant API misuse; indicates a programming error in the tenant module
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("notify requires a non-empty frontend identity")]
    EmptyIdentity,

    #[error("invalid backend name {0:?}: must be 1-16 chars of [A-Za-z0-9_-]")]
    InvalidName(String),
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Top-level error type for the Hearth backend runtime
#[derive(Debug, thiserror::Error)]
pub enum HearthError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Failure surfaced by tenant code during dispatch
    #[error("tenant error: {0}")]
    Tenant(String),
}

impl HearthError {
    /// Wrap a tenant-side failure message
    pub fn tenant(reason: impl Into<String>) -> Self {
        Self::Tenant(reason.into())
    }
}

pub type Result<T> = core::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = CodecError::OversizeField {
            size: 100,
            max: 10,
        };
        assert_eq!(err.to_string(), "oversize field: 100 bytes (max: 10)");

        let err = RegistryError::UnknownTimer(HandleId::new(9));
        assert_eq!(err.to_string(), "unknown timer id: 9");
    }

    #[test]
    fn specific_errors_convert_to_unified() {
        let err: HearthError = RegistryError::CannotClearFrontend.into();
        assert!(matches!(
            err,
            HearthError::Registry(RegistryError::CannotClearFrontend)
        ));
    }
}
