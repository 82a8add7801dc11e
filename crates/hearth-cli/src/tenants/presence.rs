//! Presence tenant: tracks which frontends have been seen and pings them
//! back on a heartbeat timer

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hearth_core::{Context, HandleId, Result, SyncMode};
use hearth_runtime::{Tenant, TenantCtl};

const HEARTBEAT: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
pub struct PresenceTenant {
    seen: HashMap<String, Instant>,
    heartbeat: Option<HandleId>,
}

impl Tenant for PresenceTenant {
    fn setup(&mut self, ctl: &mut TenantCtl<'_>) -> Result<()> {
        ctl.set_name("presence")?;
        ctl.register_frontend()?;
        self.heartbeat = Some(ctl.register_timer(HEARTBEAT)?);
        ctl.log("presence tenant ready");
        Ok(())
    }

    fn on_frontend(&mut self, ctl: &mut TenantCtl<'_>, ctx: Context) -> Result<Option<String>> {
        self.seen.insert(ctx.identity.as_str().to_string(), Instant::now());
        ctl.log(&format!("seen {} ({} total)", ctx.identity, self.seen.len()));
        if ctx.sync == SyncMode::Sync {
            Ok(Some(format!("ok: {} frontends seen", self.seen.len())))
        } else {
            Ok(None)
        }
    }

    fn on_timer(&mut self, ctl: &mut TenantCtl<'_>, timer: HandleId) -> Result<()> {
        if Some(timer) != self.heartbeat {
            return Ok(());
        }
        let identities: Vec<String> = self.seen.keys().cloned().collect();
        for identity in identities {
            ctl.notify(&identity, &format!("hi {identity}"))?;
        }
        Ok(())
    }

    fn shutdown(&mut self, ctl: &mut TenantCtl<'_>) -> Result<()> {
        ctl.log(&format!(
            "presence tenant shutting down, saw {} frontends",
            self.seen.len()
        ));
        Ok(())
    }
}
