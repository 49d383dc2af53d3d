use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use emporium_schema::{CloudinaryErrorBody, DestroyResponse, UploadResponse};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use super::{AssetHost, AssetPayload, AssetRef};
use crate::config::AssetsResolvedConfig;
use crate::error::AssetError;
use crate::utils::http::body_preview;

/// Image host backed by the Cloudinary upload API (signed requests).
pub struct CloudinaryHost {
    client: reqwest::Client,
    upload_url: Url,
    destroy_url: Url,
    api_key: String,
    api_secret: String,
    folder: Option<String>,
}

impl CloudinaryHost {
    pub fn new(cfg: &AssetsResolvedConfig, client: reqwest::Client) -> Result<Self, url::ParseError> {
        let base = cfg
            .api_url
            .join(&format!("v1_1/{}/image/", cfg.cloud_name))?;
        Ok(Self {
            client,
            upload_url: base.join("upload")?,
            destroy_url: base.join("destroy")?,
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            folder: cfg.folder.clone(),
        })
    }

    /// `sha256(sorted "k=v" pairs joined by '&' + secret)`, hex encoded.
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn signed_form(
        &self,
        mut params: Vec<(&'static str, String)>,
        timestamp: i64,
    ) -> Vec<(&'static str, String)> {
        params.push(("timestamp", timestamp.to_string()));
        let signature = self.sign(&params);
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params.push(("api_key", self.api_key.clone()));
        params
    }

    pub(crate) fn build_upload_request(
        &self,
        payload: &AssetPayload,
        timestamp: i64,
    ) -> Result<reqwest::Request, reqwest::Error> {
        let mut params = Vec::new();
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        let mut form = self.signed_form(params, timestamp);
        form.push(("file", file_source(payload)));

        self.client.post(self.upload_url.clone()).form(&form).build()
    }

    pub(crate) fn build_destroy_request(
        &self,
        public_id: &str,
        timestamp: i64,
    ) -> Result<reqwest::Request, reqwest::Error> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())], timestamp);
        self.client.post(self.destroy_url.clone()).form(&form).build()
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::Request) -> Result<T, AssetError> {
        let resp = self.client.execute(req).await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<CloudinaryErrorBody>(&bytes)
                .ok()
                .map(|b| b.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| body_preview(&bytes));
            return Err(AssetError::UpstreamStatus { status, message });
        }

        serde_json::from_slice(&bytes).map_err(|e| AssetError::Parse {
            message: e.to_string(),
            body: body_preview(&bytes),
        })
    }
}

/// Cloudinary accepts remote URLs and data URIs directly in the `file` field.
fn file_source(payload: &AssetPayload) -> String {
    match payload {
        AssetPayload::Remote(src) => src.clone(),
        AssetPayload::Bytes { data, mime } => {
            format!("data:{mime};base64,{}", B64.encode(data))
        }
    }
}

#[async_trait]
impl AssetHost for CloudinaryHost {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetRef, AssetError> {
        let req = self.build_upload_request(payload, chrono::Utc::now().timestamp())?;
        let uploaded: UploadResponse = self.send(req).await?;
        debug!(public_id = %uploaded.public_id, "image uploaded");
        Ok(AssetRef::new(uploaded.secure_url, uploaded.public_id))
    }

    async fn delete(&self, external_id: &str) -> Result<(), AssetError> {
        let req = self.build_destroy_request(external_id, chrono::Utc::now().timestamp())?;
        let destroyed: DestroyResponse = self.send(req).await?;
        if destroyed.is_released() {
            Ok(())
        } else {
            Err(AssetError::Rejected {
                public_id: external_id.to_string(),
                result: destroyed.result,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(folder: Option<&str>) -> CloudinaryHost {
        let cfg = AssetsResolvedConfig {
            api_url: Url::parse("http://cdn.example.test").expect("invalid url"),
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "abcd".to_string(),
            folder: folder.map(str::to_string),
            upload_concurrency: 2,
            proxy: None,
            enable_multiplexing: false,
        };
        CloudinaryHost::new(&cfg, reqwest::Client::new()).expect("host")
    }

    fn body_text(req: &reqwest::Request) -> String {
        let bytes = req
            .body()
            .and_then(|b| b.as_bytes())
            .expect("buffered form body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[test]
    fn upload_request_is_signed_over_sorted_params() {
        let req = host(Some("shop"))
            .build_upload_request(&AssetPayload::remote("http://img.test/a.png"), 1_700_000_000)
            .expect("build upload");

        assert_eq!(
            req.url().as_str(),
            "http://cdn.example.test/v1_1/demo/image/upload"
        );
        let body = body_text(&req);
        assert!(body.contains(
            "signature=d6fe56fb7e17d1c38682238c8ec8b46b867bb645469c51382cc95f28b476037f"
        ));
        assert!(body.contains("api_key=key"));
        assert!(body.contains("file=http%3A%2F%2Fimg.test%2Fa.png"));
    }

    #[test]
    fn destroy_request_signs_public_id() {
        let req = host(None)
            .build_destroy_request("shop/p1", 1_700_000_000)
            .expect("build destroy");

        assert_eq!(
            req.url().as_str(),
            "http://cdn.example.test/v1_1/demo/image/destroy"
        );
        assert!(body_text(&req).contains(
            "signature=b47d2153a9fac85823498009a17fa1dc103f72f69130b045aa9b127afe4782ba"
        ));
    }

    #[test]
    fn byte_payloads_become_data_uris() {
        let src = file_source(&AssetPayload::bytes(&b"hi"[..], "image/png"));
        assert_eq!(src, "data:image/png;base64,aGk=");
    }
}
