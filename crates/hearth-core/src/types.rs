//! Core types for the Hearth backend runtime
//!
//! Newtype wrappers for routing identifiers and registry handles, plus the
//! immutable context record handed to the frontend handler.

use core::fmt;
use core::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

// ----------------------------------------------------------------------------
// Frontend Identifier
// ----------------------------------------------------------------------------

/// Opaque identifier for a connected frontend.
///
/// Supplied by the transport layer as the routing frame of an inbound
/// message. The runtime never interprets its structure beyond using it as a
/// routing key for `notify`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrontendId(String);

impl FrontendId {
    /// Create a FrontendId from an already-validated string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a FrontendId from a raw routing frame.
    ///
    /// Frontends identify themselves with UTF-8 strings; a non-UTF-8 routing
    /// frame is a protocol violation.
    pub fn from_frame(frame: &[u8]) -> Result<Self, TransportError> {
        core::str::from_utf8(frame)
            .map(|s| Self(s.to_string()))
            .map_err(|_| TransportError::BadIdentityFrame {
                len: frame.len(),
            })
    }

    /// The identity as raw bytes, suitable for a routing frame
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrontendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for FrontendId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for FrontendId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ----------------------------------------------------------------------------
// Registry Handle
// ----------------------------------------------------------------------------

/// Process-unique, monotonically increasing handle for a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Sync Mode
// ----------------------------------------------------------------------------

/// Whether the sending frontend blocks for a reply.
///
/// Determined purely by wire shape: a 3-frame message is synchronous, a
/// 2-frame message is asynchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// The frontend is blocked until the handler's reply is sent back
    Sync,
    /// Fire-and-forget; any handler return value is discarded
    Async,
}

impl SyncMode {
    pub fn is_sync(&self) -> bool {
        matches!(self, SyncMode::Sync)
    }
}

// ----------------------------------------------------------------------------
// Handler Context
// ----------------------------------------------------------------------------

/// Context for one inbound frontend message.
///
/// Built once per message and passed by value to the frontend handler.
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Identity of the sending frontend
    pub identity: FrontendId,
    /// Whether the sender is blocked on a reply
    pub sync: SyncMode,
    /// Message body, extracted from the first sub-record of the envelope
    pub message: String,
}

impl Context {
    pub fn new(identity: FrontendId, sync: SyncMode, message: String) -> Self {
        Self {
            identity,
            sync,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_id_round_trips_through_frames() {
        let id = FrontendId::new("fe1");
        let rebuilt = FrontendId::from_frame(id.as_bytes()).unwrap();
        assert_eq!(id, rebuilt);
        assert_eq!(rebuilt.as_str(), "fe1");
    }

    #[test]
    fn frontend_id_rejects_non_utf8_frames() {
        let err = FrontendId::from_frame(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, TransportError::BadIdentityFrame { len: 3 }));
    }

    #[test]
    fn handle_ids_order_by_value() {
        assert!(HandleId::new(1) < HandleId::new(2));
        assert_eq!(HandleId::new(7).value(), 7);
    }
}
