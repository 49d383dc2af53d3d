mod auth;
mod basic;
mod upstreams;

pub use auth::AuthConfig;
pub use basic::BasicConfig;
pub use upstreams::{
    AssetsConfig, AssetsResolvedConfig, PaymentsConfig, PaymentsResolvedConfig, UpstreamDefaults,
    UpstreamsConfig,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Token issuance settings (see `auth` table in config.toml).
    #[serde(default)]
    pub auth: AuthConfig,

    /// Image host and payment provider settings (see `upstreams` table in config.toml).
    #[serde(default)]
    pub upstreams: UpstreamsConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "EMPORIUM_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `EMPORIUM_`-prefixed environment variables (`__` separates tables).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration without validating secrets.
    ///
    /// Note: binaries should call `Config::load()` instead so a missing
    /// `auth.jwt_secret` fails at startup rather than at the first signin.
    pub fn from_optional_sources() -> Self {
        Self::figment()
            .extract()
            .unwrap_or_else(|err| panic!("failed to extract configuration: {err}"))
    }

    /// Loads configuration and validates required fields.
    pub fn load() -> Self {
        let cfg = Self::from_optional_sources();
        if cfg.auth.jwt_secret.trim().is_empty() {
            panic!("auth.jwt_secret must be set and non-empty");
        }
        cfg
    }

    pub fn assets(&self) -> AssetsResolvedConfig {
        self.upstreams.assets.resolve(&self.upstreams.defaults)
    }

    pub fn payments(&self) -> PaymentsResolvedConfig {
        self.upstreams.payments.resolve(&self.upstreams.defaults)
    }
}
