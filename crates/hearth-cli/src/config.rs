//! Application configuration
//!
//! Defaults, optionally overlaid by a TOML file, optionally overlaid by
//! command-line flags.

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use hearth_runtime::TransportConfig;

use crate::cli::Cli;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which demo tenant to run
    pub tenant: String,
    pub transport: TransportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tenant: "echo".to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Command-line flags win over the config file
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(tenant) = &cli.tenant {
            self.tenant = tenant.clone();
        }
        if let Some(bind) = &cli.bind {
            self.transport.bind_addr = bind.clone();
        }
        if let Some(base_port) = cli.base_port {
            self.transport.base_port = base_port;
        }
        if let Some(backend_key) = &cli.backend_key {
            self.transport.backend_cert = backend_key.clone();
        }
        if let Some(frontend_key) = &cli.frontend_key {
            self.transport.frontend_cert = frontend_key.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_partial_config_file() {
        let config: AppConfig = toml::from_str(
            r#"
            tenant = "presence"

            [transport]
            base_port = 7000
            "#,
        )
        .unwrap();

        assert_eq!(config.tenant, "presence");
        assert_eq!(config.transport.base_port, 7000);
        // Unspecified fields keep their defaults
        assert_eq!(config.transport.bind_addr, "127.0.0.1");
    }
}
