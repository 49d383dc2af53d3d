use serde::{Deserialize, Serialize};
use url::Url;

use super::UpstreamDefaults;

/// Payment provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Base API URL of the payment provider.
    /// TOML: `upstreams.payments.api_url`. Default: `https://api.stripe.com`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Secret API key. Env: `EMPORIUM_UPSTREAMS__PAYMENTS__SECRET_KEY`.
    #[serde(default)]
    pub secret_key: String,

    /// Storefront base URL used to build checkout success/cancel redirects.
    /// TOML: `upstreams.payments.client_base_url`. Default: `http://localhost:3000`.
    #[serde(default = "default_client_base_url")]
    pub client_base_url: Url,

    /// ISO currency code for line items.
    /// TOML: `upstreams.payments.currency`. Default: `usd`.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// TOML: `upstreams.payments.proxy`. Falls back to `upstreams.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `upstreams.payments.enable_multiplexing`.
    /// Falls back to `upstreams.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PaymentsResolvedConfig {
    pub api_url: Url,
    pub secret_key: String,
    pub client_base_url: Url,
    pub currency: String,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
}

impl PaymentsConfig {
    pub fn resolve(&self, defaults: &UpstreamDefaults) -> PaymentsResolvedConfig {
        PaymentsResolvedConfig {
            api_url: self.api_url.clone(),
            secret_key: self.secret_key.clone(),
            client_base_url: self.client_base_url.clone(),
            currency: self.currency.to_ascii_lowercase(),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            secret_key: String::new(),
            client_base_url: default_client_base_url(),
            currency: default_currency(),
            proxy: None,
            enable_multiplexing: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.stripe.com").expect("valid default payment API URL")
}

fn default_client_base_url() -> Url {
    Url::parse("http://localhost:3000").expect("valid default client base URL")
}

fn default_currency() -> String {
    "usd".to_string()
}
