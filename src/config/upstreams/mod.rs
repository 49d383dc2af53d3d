mod assets;
mod payments;

pub use assets::{AssetsConfig, AssetsResolvedConfig};
pub use payments::{PaymentsConfig, PaymentsResolvedConfig};

use serde::{Deserialize, Serialize};
use url::Url;

/// Shared upstream defaults (used when the upstream-level value is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamDefaults {
    /// Optional outbound HTTP proxy. If set, used for reqwest clients.
    /// TOML: `upstreams.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `upstreams.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default = "default_enable_multiplexing")]
    pub enable_multiplexing: bool,
}

impl Default for UpstreamDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: default_enable_multiplexing(),
        }
    }
}

/// All upstream configurations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct UpstreamsConfig {
    /// Global defaults for upstreams (overridden per upstream if set).
    #[serde(default)]
    pub defaults: UpstreamDefaults,

    /// Image host (Cloudinary) configuration.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Payment provider (Stripe) configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,
}

fn default_enable_multiplexing() -> bool {
    false
}
