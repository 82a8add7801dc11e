//! Echo tenant: replies to every sync message with its own body

use hearth_core::{Context, HandleId, Result, SyncMode};
use hearth_runtime::{Tenant, TenantCtl};

#[derive(Debug, Default)]
pub struct EchoTenant;

impl Tenant for EchoTenant {
    fn setup(&mut self, ctl: &mut TenantCtl<'_>) -> Result<()> {
        ctl.set_name("echo")?;
        ctl.register_frontend()?;
        ctl.log("echo tenant ready");
        Ok(())
    }

    fn on_frontend(&mut self, ctl: &mut TenantCtl<'_>, ctx: Context) -> Result<Option<String>> {
        ctl.log(&format!(
            "message from {}: {}",
            ctx.identity, ctx.message
        ));
        if ctx.sync == SyncMode::Sync {
            Ok(Some(ctx.message))
        } else {
            Ok(None)
        }
    }

    fn on_timer(&mut self, _ctl: &mut TenantCtl<'_>, _timer: HandleId) -> Result<()> {
        Ok(())
    }
}
