//! Tenant module contract
//!
//! A tenant module supplies the backend's behavior. Its `setup` runs once at
//! startup and must register exactly one frontend handler (and any number of
//! timers); after that the dispatch loop calls back into `on_frontend` and
//! `on_timer`. Every callback receives a [`TenantCtl`], the only path tenant
//! code has to the outbound API and the registry.
//!
//! Callbacks run to completion on the loop thread. A handler error during
//! normal dispatch propagates out of the loop and is fatal; there is no
//! automatic restart.

use std::process;
use std::thread;
use std::time::Duration;

use tracing::warn;

use hearth_core::{Context, EventRegistry, HandleId, Outbound, Registration, Result};

// ----------------------------------------------------------------------------
// Tenant Trait
// ----------------------------------------------------------------------------

/// User-supplied handler set deciding backend behavior
pub trait Tenant {
    /// One-time initialization; must register exactly one frontend handler
    fn setup(&mut self, ctl: &mut TenantCtl<'_>) -> Result<()>;

    /// Called for each inbound frontend message.
    ///
    /// For a sync message the returned string is sent back as the reply
    /// (`None` replies with an empty string); for an async message the
    /// return value is discarded.
    fn on_frontend(&mut self, ctl: &mut TenantCtl<'_>, ctx: Context) -> Result<Option<String>>;

    /// Called when a registered timer's interval has elapsed
    fn on_timer(&mut self, ctl: &mut TenantCtl<'_>, timer: HandleId) -> Result<()>;

    /// Graceful-teardown hook; errors are swallowed and logged, never
    /// propagated
    fn shutdown(&mut self, _ctl: &mut TenantCtl<'_>) -> Result<()> {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tenant Control Facade
// ----------------------------------------------------------------------------

/// The runtime surface handed to tenant callbacks.
///
/// Borrows the outbound half and the registry for the duration of one
/// callback; tenant code never holds runtime state across calls.
pub struct TenantCtl<'a> {
    outbound: &'a mut dyn Outbound,
    registry: &'a mut EventRegistry,
}

impl<'a> TenantCtl<'a> {
    pub(crate) fn new(outbound: &'a mut dyn Outbound, registry: &'a mut EventRegistry) -> Self {
        Self { outbound, registry }
    }

    /// Best-effort message to all subscribed frontends
    pub fn broadcast(&mut self, message: &str) -> Result<()> {
        self.outbound.broadcast(message)
    }

    /// Best-effort async message to one frontend
    pub fn notify(&mut self, identity: &str, message: &str) -> Result<()> {
        self.outbound.notify(identity, message)
    }

    /// Write to the backend's logging sink
    pub fn log(&mut self, message: &str) {
        self.outbound.log(message);
    }

    /// Name this backend (alphanumeric, `-`, `_`; at most 16 chars)
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.outbound.set_name(name)
    }

    /// Register the frontend handler; at most one may exist
    pub fn register_frontend(&mut self) -> Result<HandleId> {
        Ok(self.registry.register(Registration::Frontend)?)
    }

    /// Register a periodic timer with `interval > 0`
    pub fn register_timer(&mut self, interval: Duration) -> Result<HandleId> {
        Ok(self.registry.register(Registration::Timer { interval })?)
    }

    /// Deactivate a timer; it fires no more and is removed after the next
    /// scan. The frontend handler can never be cleared.
    pub fn clear_timer(&mut self, handle: HandleId) -> Result<()> {
        Ok(self.registry.clear(handle)?)
    }

    /// Terminate the process without teardown, after a brief delay to let
    /// outbound queues drain
    pub fn exit(&mut self) -> ! {
        warn!("tenant requested process exit");
        thread::sleep(Duration::from_secs(1));
        process::exit(0);
    }
}
