//! Demo tenant modules
//!
//! Small backends showing the tenant contract end to end. Real deployments
//! supply their own `Tenant` implementation and bootstrap.

pub mod echo;
pub mod presence;

use hearth_runtime::Tenant;

pub use echo::EchoTenant;
pub use presence::PresenceTenant;

/// Look up a demo tenant by name
pub fn build(name: &str) -> Option<Box<dyn Tenant>> {
    match name {
        "echo" => Some(Box::new(EchoTenant::default())),
        "presence" => Some(Box::new(PresenceTenant::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tenants_resolve() {
        assert!(build("echo").is_some());
        assert!(build("presence").is_some());
        assert!(build("nope").is_none());
    }
}
