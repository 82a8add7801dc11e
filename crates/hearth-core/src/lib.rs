//! Hearth Core Protocol Implementation
//!
//! This crate provides the foundational types for the Hearth backend runtime:
//! the envelope wire codec, the event registry that routes inbound frontend
//! traffic and periodic timers, and the outbound API surface consumed by
//! tenant modules. It contains no transport code; the runtime crate supplies
//! the sockets and the dispatch loop.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod api;
pub mod envelope;
pub mod errors;
pub mod registry;
pub mod types;
pub mod wire;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use api::{validate_name, Outbound, MAX_LOG_LINE, MAX_NAME_LEN};
pub use envelope::{Envelope, RecordKind, Section, Status, SubRecord, MAX_FIELD_SIZE};
pub use errors::{ApiError, CodecError, HearthError, RegistryError, Result, TransportError};
pub use registry::{EntryStatus, EventKind, EventRegistry, Registration, RegistryEntry};
pub use types::{Context, FrontendId, HandleId, SyncMode};
pub use wire::WireFormat;
