use super::types::{
    DEFAULT_GATEWAY_URL, DEFAULT_TIMEOUT_SECS, GatewayConfig, LogoConfig, RawGatewayConfig,
    RawLogoConfig, RawRelayConfig, RelayConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Env var overriding the gateway base URL from any config file
pub const GATEWAY_URL_ENV: &str = "RELAY_GATEWAY_URL";

/// Env var relocating the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "RELAY_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + environment)
    pub fn load() -> Result<RelayConfig> {
        let paths = [Self::user_config_path(), Self::project_config_path()];
        let raw = Self::load_layers(&paths)?;
        let gateway_url = std::env::var(GATEWAY_URL_ENV).ok();
        Ok(Self::apply_env(Self::finalize(raw), gateway_url))
    }

    /// Read and merge config files in order; later files win. Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<RawRelayConfig> {
        let mut raw = RawRelayConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_raw(path)? {
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(raw)
    }

    fn read_raw(path: &Path) -> Result<Option<RawRelayConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Get user config path (~/.config/relay/config.toml)
    pub fn user_config_path() -> PathBuf {
        relay_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with RELAY_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        match std::env::var(PROJECT_CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("config.toml"),
            _ => PathBuf::from(".relay/config.toml"),
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawRelayConfig, overlay: RawRelayConfig) -> RawRelayConfig {
        RawRelayConfig {
            gateway: RawGatewayConfig {
                base_url: overlay.gateway.base_url.or(base.gateway.base_url),
                timeout_secs: overlay.gateway.timeout_secs.or(base.gateway.timeout_secs),
            },
            logo: RawLogoConfig {
                style: overlay.logo.style.or(base.logo.style),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawRelayConfig) -> RelayConfig {
        RelayConfig {
            gateway: GatewayConfig {
                base_url: raw
                    .gateway
                    .base_url
                    .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
                timeout_secs: raw.gateway.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            logo: LogoConfig {
                style: raw.logo.style.unwrap_or_default(),
            },
        }
    }

    /// Apply the gateway URL override, ignoring blank values
    fn apply_env(mut config: RelayConfig, gateway_url: Option<String>) -> RelayConfig {
        if let Some(url) = gateway_url.filter(|u| !u.trim().is_empty()) {
            config.gateway.base_url = url.trim().to_string();
        }
        config
    }
}
