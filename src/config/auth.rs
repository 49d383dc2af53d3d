use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token issuance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret for issued tokens (required, non-empty).
    /// TOML: `auth.jwt_secret`. Env: `EMPORIUM_AUTH__JWT_SECRET`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub jwt_secret: String,

    /// Token lifetime in seconds.
    /// TOML: `auth.token_ttl_secs`. Default: 7 days.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No insecure default. `Config::load()` enforces non-empty.
            jwt_secret: "".to_string(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for auth.jwt_secret",
        )),
    }
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}
