//! Hearth Backend Runtime
//!
//! Couples the core protocol (envelope codec, event registry) to a secured
//! message-queue transport and runs the poll-driven dispatch loop. One
//! [`BackendRuntime`] exists per process; a tenant module plugs in through
//! the [`Tenant`] trait and talks back through the control facade handed to
//! every callback.
//!
//! The runtime is single-threaded and cooperative: the only blocking point
//! is the transport poll, bounded by [`TICK_TIMEOUT`]. A slow tenant
//! callback stalls the whole loop; tenant code must return promptly.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod clock;
pub mod dispatch;
pub mod runtime;
pub mod tenant;
pub mod transport;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::TICK_TIMEOUT;
pub use runtime::BackendRuntime;
pub use tenant::{Tenant, TenantCtl};
pub use transport::{
    AdmissionPolicy, AdmissionRequest, AllowAny, Certificate, KeyAllowList, MemoryHandle,
    MemoryTransport, Transport, TransportConfig, ZmqTransport,
};
