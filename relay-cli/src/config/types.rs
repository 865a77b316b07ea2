use relay_models::identity::IconStyle;
use serde::{Deserialize, Serialize};

/// Default gateway API root
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8483/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRelayConfig {
    #[serde(default)]
    pub gateway: RawGatewayConfig,

    #[serde(default)]
    pub logo: RawLogoConfig,
}

/// Gateway config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawGatewayConfig {
    /// API root of the provider gateway
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLogoConfig {
    /// Preferred icon style
    pub style: Option<IconStyle>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RelayConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub logo: LogoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// API root of the provider gateway
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogoConfig {
    /// Preferred icon style
    pub style: IconStyle,
}
