use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamDefaults;

/// Image host configuration managed by Figment.
///
/// Credentials default to empty strings so the server can boot without an
/// image host; uploads then fail with an upstream error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Base API URL of the image host.
    /// TOML: `upstreams.assets.api_url`. Default: `https://api.cloudinary.com`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// TOML: `upstreams.assets.cloud_name`.
    #[serde(default)]
    pub cloud_name: String,

    /// TOML: `upstreams.assets.api_key`.
    #[serde(default)]
    pub api_key: String,

    /// TOML: `upstreams.assets.api_secret`. Env: `EMPORIUM_UPSTREAMS__ASSETS__API_SECRET`.
    #[serde(default)]
    pub api_secret: String,

    /// Optional folder prefix for uploaded assets.
    /// TOML: `upstreams.assets.folder`.
    #[serde(default)]
    pub folder: Option<String>,

    /// Max simultaneous in-flight calls to the image host per request.
    /// TOML: `upstreams.assets.upload_concurrency`. Default: `2`.
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,

    /// TOML: `upstreams.assets.proxy`. Falls back to `upstreams.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `upstreams.assets.enable_multiplexing`.
    /// Falls back to `upstreams.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AssetsResolvedConfig {
    pub api_url: Url,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub upload_concurrency: usize,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
}

impl AssetsConfig {
    pub fn resolve(&self, defaults: &UpstreamDefaults) -> AssetsResolvedConfig {
        AssetsResolvedConfig {
            api_url: self.api_url.clone(),
            cloud_name: self.cloud_name.clone(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            folder: self.folder.clone().filter(|f| !f.trim().is_empty()),
            upload_concurrency: self.upload_concurrency.max(1),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: None,
            upload_concurrency: default_upload_concurrency(),
            proxy: None,
            enable_multiplexing: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.cloudinary.com").expect("valid default image host URL")
}

fn default_upload_concurrency() -> usize {
    2
}
