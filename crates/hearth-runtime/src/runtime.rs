//! Backend runtime lifecycle
//!
//! Owns the transport, the event registry, the clock, and the process-wide
//! counters (ticks, messages in/out). The outbound API tenant handlers call
//! into is implemented here; the dispatch loop itself lives in
//! [`crate::dispatch`].

use std::time::Duration;

use tracing::{debug, error, info, warn};

use hearth_core::{
    validate_name, ApiError, Envelope, EventRegistry, Outbound, RecordKind, Result, Status,
    WireFormat, MAX_LOG_LINE,
};

use crate::clock::{Clock, SystemClock};
use crate::tenant::{Tenant, TenantCtl};
use crate::transport::Transport;

// ----------------------------------------------------------------------------
// Backend Runtime
// ----------------------------------------------------------------------------

/// The per-process backend runtime
pub struct BackendRuntime<T: Transport> {
    pub(crate) core: RuntimeCore<T>,
    pub(crate) registry: EventRegistry,
}

/// Transport, counters, and outbound scratch state.
///
/// Split from the registry so the dispatch loop can hand tenant callbacks a
/// mutable outbound view while it walks the registry.
pub(crate) struct RuntimeCore<T> {
    pub(crate) transport: T,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) ticks: u64,
    pub(crate) messages_in: u64,
    pub(crate) messages_out: u64,
    name: String,
    scratch: Envelope,
    encode_buf: Vec<u8>,
    shut_down: bool,
}

impl<T: Transport> BackendRuntime<T> {
    /// Build a runtime on the system clock
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, Box::new(SystemClock::new()))
    }

    /// Build a runtime on an explicit clock (tests use a manual one)
    pub fn with_clock(transport: T, clock: Box<dyn Clock>) -> Self {
        Self {
            core: RuntimeCore {
                transport,
                clock,
                ticks: 0,
                messages_in: 0,
                messages_out: 0,
                name: "unnamed".to_string(),
                scratch: Envelope::new(),
                encode_buf: Vec::new(),
                shut_down: false,
            },
            registry: EventRegistry::new(),
        }
    }

    /// Run the tenant's setup routine, then enforce that it registered
    /// exactly one frontend handler. Fatal on failure; the loop must not
    /// start half-wired.
    pub fn init_tenant(&mut self, tenant: &mut dyn Tenant) -> Result<()> {
        {
            let mut ctl = TenantCtl::new(&mut self.core, &mut self.registry);
            tenant.setup(&mut ctl)?;
        }
        self.registry.validate_after_init()?;
        debug!(entries = self.registry.len(), "tenant setup complete");
        Ok(())
    }

    /// Graceful teardown: tenant shutdown hook (errors swallowed and
    /// logged), transport close, then the aggregate counters. Idempotent; a
    /// second call logs an error and returns.
    pub fn shutdown(&mut self, tenant: &mut dyn Tenant) {
        if self.core.shut_down {
            error!("shutdown called twice");
            return;
        }
        self.core.shut_down = true;
        warn!("shutting down");

        {
            let mut ctl = TenantCtl::new(&mut self.core, &mut self.registry);
            if let Err(err) = tenant.shutdown(&mut ctl) {
                error!(error = %err, "error during tenant shutdown");
            }
        }

        if let Err(err) = self.core.transport.close() {
            error!(error = %err, "error closing transport");
        }

        let elapsed = self.core.clock.elapsed();
        let total = self.core.messages_in + self.core.messages_out;
        let rate = if elapsed > Duration::ZERO {
            total as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        info!(
            ticks = self.core.ticks,
            messages_in = self.core.messages_in,
            messages_out = self.core.messages_out,
            elapsed_secs = format_args!("{:.3}", elapsed.as_secs_f64()),
            rate = format_args!("{rate:.3} msgs/sec"),
            "shutdown complete"
        );
    }

    pub fn ticks(&self) -> u64 {
        self.core.ticks
    }

    pub fn messages_in(&self) -> u64 {
        self.core.messages_in
    }

    pub fn messages_out(&self) -> u64 {
        self.core.messages_out
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn is_shut_down(&self) -> bool {
        self.core.shut_down
    }
}

// ----------------------------------------------------------------------------
// Outbound Implementation
// ----------------------------------------------------------------------------

impl<T: Transport> RuntimeCore<T> {
    /// Encode `body` into the reusable scratch envelope and buffer
    fn encode_outbound(&mut self, kind: RecordKind, body: &str) -> Result<()> {
        self.scratch.compose(kind, Status::Success, body.as_bytes());
        WireFormat::encode_into(&self.scratch, &mut self.encode_buf)?;
        Ok(())
    }

    /// Send the reply half of a sync round-trip back to `identity`
    pub(crate) fn send_sync_reply(&mut self, identity: &[u8], body: &str) -> Result<()> {
        self.encode_outbound(RecordKind::Reply, body)?;
        debug!(bytes = self.encode_buf.len(), "sending sync reply");
        self.transport
            .send_reply(&[identity, b"", &self.encode_buf])?;
        self.messages_out += 1;
        Ok(())
    }
}

impl<T: Transport> Outbound for RuntimeCore<T> {
    fn broadcast(&mut self, message: &str) -> Result<()> {
        self.encode_outbound(RecordKind::Message, message)?;
        self.transport.send_broadcast(&self.encode_buf)?;
        self.messages_out += 1;
        debug!(bytes = self.encode_buf.len(), "sending broadcast");
        Ok(())
    }

    fn notify(&mut self, identity: &str, message: &str) -> Result<()> {
        if identity.is_empty() {
            return Err(ApiError::EmptyIdentity.into());
        }
        self.encode_outbound(RecordKind::Message, message)?;
        self.transport
            .send_reply(&[identity.as_bytes(), &self.encode_buf])?;
        self.messages_out += 1;
        debug!(
            bytes = self.encode_buf.len(),
            identity, "sending notification"
        );
        Ok(())
    }

    fn log(&mut self, message: &str) {
        if message.len() > MAX_LOG_LINE {
            let truncated: String = message.chars().take(MAX_LOG_LINE).collect();
            info!(tick = self.ticks, name = %self.name, "{truncated}");
        } else {
            info!(tick = self.ticks, name = %self.name, "{message}");
        }
    }

    fn set_name(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        debug!(name, "setting backend name");
        self.name = name.to_string();
        Ok(())
    }
}
