//! The dispatch loop
//!
//! One tick: wait up to the tick budget for transport readiness, dispatch at
//! most one inbound frontend message, then scan the timer table and sweep
//! inactive entries. Socket dispatch always precedes timer dispatch within a
//! tick, and because exactly one message is dequeued per tick, a sync reply
//! is always sent before the next message from any frontend is processed.
//! Timers fire in registration order.
//!
//! Protocol errors (wrong frame count, undecodable payload, non-UTF-8
//! identity or body) are logged and the message is dropped; the loop
//! continues. Tenant handler errors propagate and are fatal.

use std::time::Duration;

use tracing::{debug, info, warn};

use hearth_core::{CodecError, Context, FrontendId, Result, SyncMode, WireFormat};

use crate::runtime::BackendRuntime;
use crate::tenant::{Tenant, TenantCtl};
use crate::transport::Transport;

/// Poll budget for one tick; bounds how long the loop can go without
/// checking timers
pub const TICK_TIMEOUT: Duration = Duration::from_millis(250);

impl<T: Transport> BackendRuntime<T> {
    /// Run the event loop forever.
    ///
    /// There is no normal exit; this returns only on error (process exit and
    /// `TenantCtl::exit` are the other ways out).
    pub fn run(&mut self, tenant: &mut dyn Tenant) -> Result<()> {
        info!("starting event loop");
        loop {
            self.tick(tenant)?;
        }
    }

    /// One iteration of the dispatch loop; public so tests can step the
    /// runtime deterministically
    pub fn tick(&mut self, tenant: &mut dyn Tenant) -> Result<()> {
        if self.core.transport.poll_inbound(TICK_TIMEOUT)? {
            let frames = self.core.transport.recv_inbound()?;
            self.core.messages_in += 1;
            self.dispatch_frames(tenant, frames)?;
        }

        self.scan_timers(tenant)?;
        self.registry.sweep_inactive();
        self.core.ticks += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Socket dispatch
    // ------------------------------------------------------------------

    /// Wire shape decides sync vs async: 3 frames means the frontend blocks
    /// on a reply, 2 frames is fire-and-forget
    fn dispatch_frames(&mut self, tenant: &mut dyn Tenant, frames: Vec<Vec<u8>>) -> Result<()> {
        match frames.len() {
            3 => self.dispatch_sync(tenant, frames),
            2 => self.dispatch_async(tenant, frames),
            count => {
                warn!(frames = count, "dropping message with bad frame count");
                Ok(())
            }
        }
    }

    fn dispatch_sync(&mut self, tenant: &mut dyn Tenant, frames: Vec<Vec<u8>>) -> Result<()> {
        let Ok([identity, _delimiter, payload]) = <[Vec<u8>; 3]>::try_from(frames) else {
            return Ok(());
        };
        let ctx = match build_context(&identity, &payload, SyncMode::Sync) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(error = %err, "dropping undecodable sync message");
                return Ok(());
            }
        };

        debug!(identity = %ctx.identity, "dispatching sync message");
        let reply = {
            let mut ctl = TenantCtl::new(&mut self.core, &mut self.registry);
            tenant.on_frontend(&mut ctl, ctx)?
        };

        // The reply goes out before the loop touches anything else; this
        // serializes all sync round-trips through the single handler.
        self.core
            .send_sync_reply(&identity, reply.as_deref().unwrap_or_default())
    }

    fn dispatch_async(&mut self, tenant: &mut dyn Tenant, frames: Vec<Vec<u8>>) -> Result<()> {
        let Ok([identity, payload]) = <[Vec<u8>; 2]>::try_from(frames) else {
            return Ok(());
        };
        let ctx = match build_context(&identity, &payload, SyncMode::Async) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(error = %err, "dropping undecodable async message");
                return Ok(());
            }
        };

        debug!(identity = %ctx.identity, "dispatching async message");
        let mut ctl = TenantCtl::new(&mut self.core, &mut self.registry);
        tenant.on_frontend(&mut ctl, ctx)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Timer dispatch
    // ------------------------------------------------------------------

    /// Fire every active timer whose interval has elapsed, in registration
    /// order, strictly after the tick's socket dispatch
    fn scan_timers(&mut self, tenant: &mut dyn Tenant) -> Result<()> {
        let now = self.core.clock.elapsed();
        for handle in self.registry.due_timers(now) {
            // An earlier handler in this scan may have cleared it
            if !self.registry.is_active(handle) {
                continue;
            }
            self.registry.touch(handle, now);
            let mut ctl = TenantCtl::new(&mut self.core, &mut self.registry);
            tenant.on_timer(&mut ctl, handle)?;
        }
        Ok(())
    }
}

/// Decode one inbound message into the immutable handler context
fn build_context(identity: &[u8], payload: &[u8], sync: SyncMode) -> Result<Context> {
    let identity = FrontendId::from_frame(identity)?;
    let envelope = WireFormat::decode(payload)?;
    let value = envelope
        .first_value()
        .ok_or_else(|| CodecError::malformed("envelope carries no records"))?;
    let message = String::from_utf8(value.to_vec())
        .map_err(|_| CodecError::malformed("message body is not valid UTF-8"))?;
    Ok(Context::new(identity, sync, message))
}
