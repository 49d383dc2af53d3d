use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

/// Max characters of an upstream body kept in logs and error messages.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// Builds an outbound client for one upstream.
///
/// With multiplexing disabled the client speaks HTTP/1 only and never reuses
/// idle connections.
pub fn build_client(
    user_agent: &str,
    proxy: Option<&Url>,
    enable_multiplexing: bool,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(2 * 60));

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if !enable_multiplexing {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    } else {
        builder = builder.http2_adaptive_window(true);
    }

    builder.default_headers(headers).build()
}

/// Lossy, length-capped rendering of an upstream body.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    let raw_body = String::from_utf8_lossy(bytes);
    format!("{:.len$}", raw_body, len = UPSTREAM_BODY_PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_preview_truncates_long_bodies() {
        let body = "x".repeat(UPSTREAM_BODY_PREVIEW_CHARS + 50);
        assert_eq!(
            body_preview(body.as_bytes()).len(),
            UPSTREAM_BODY_PREVIEW_CHARS
        );
        assert_eq!(body_preview(b"short"), "short");
    }
}
