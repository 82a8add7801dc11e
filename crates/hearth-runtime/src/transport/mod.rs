//! Transport layer for the backend runtime
//!
//! Two server-role endpoints back every transport: a bidirectional reply
//! endpoint carrying multipart frames (inbound frontend traffic plus
//! per-identity notifications) and a one-way broadcast endpoint. The
//! production implementation is [`ZmqTransport`]; tests drive the dispatch
//! loop through [`MemoryTransport`].

pub mod curve;
pub mod memory;
pub mod policy;
pub mod zap;
pub mod zeromq;

use std::time::Duration;

use hearth_core::{Result, TransportError};

pub use curve::Certificate;
pub use memory::{MemoryHandle, MemoryTransport};
pub use policy::{AdmissionPolicy, AdmissionRequest, AllowAny, KeyAllowList};
pub use zeromq::{TransportConfig, ZmqTransport};

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// The endpoints the dispatch loop multiplexes.
///
/// Exclusively owned by the runtime instance; all methods are best-effort
/// sends or non-blocking-past-timeout reads.
pub trait Transport {
    /// Wait up to `timeout` for readiness on the reply endpoint
    fn poll_inbound(&mut self, timeout: Duration) -> Result<bool>;

    /// Read exactly one multipart message from the reply endpoint
    fn recv_inbound(&mut self) -> Result<Vec<Vec<u8>>>;

    /// Send one multipart message on the reply endpoint
    fn send_reply(&mut self, frames: &[&[u8]]) -> Result<()>;

    /// Send one message on the broadcast endpoint
    fn send_broadcast(&mut self, payload: &[u8]) -> Result<()>;

    /// Tear the endpoints down; later sends fail with `Closed`
    fn close(&mut self) -> Result<()>;
}

pub(crate) fn socket_err(err: zmq::Error) -> TransportError {
    TransportError::Socket(err.to_string())
}
