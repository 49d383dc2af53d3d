use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Successful answer of `POST /v1_1/{cloud}/image/upload`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadResponse {
    pub public_id: String,

    /// HTTPS delivery URL; this is what resources persist.
    pub secure_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Answer of `POST /v1_1/{cloud}/image/destroy`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestroyResponse {
    pub result: String,
}

impl DestroyResponse {
    /// `not found` counts as released: the asset is gone either way.
    pub fn is_released(&self) -> bool {
        matches!(self.result.as_str(), "ok" | "not found")
    }
}

/// Error envelope returned with 4xx/5xx statuses.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CloudinaryErrorBody {
    #[serde(default)]
    pub error: CloudinaryErrorObject,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CloudinaryErrorObject {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_keeps_unknown_fields_in_extra() {
        let raw = r#"{
            "public_id": "shop/abc",
            "secure_url": "https://res.example.com/shop/abc.png",
            "format": "png",
            "width": 640
        }"#;

        let resp: UploadResponse = serde_json::from_str(raw).expect("parse upload response");
        assert_eq!(resp.public_id, "shop/abc");
        assert_eq!(resp.format.as_deref(), Some("png"));
        assert_eq!(resp.extra.get("width"), Some(&Value::from(640)));
    }

    #[test]
    fn destroy_not_found_is_released() {
        let resp: DestroyResponse =
            serde_json::from_str(r#"{"result":"not found"}"#).expect("parse destroy response");
        assert!(resp.is_released());

        let resp: DestroyResponse =
            serde_json::from_str(r#"{"result":"error"}"#).expect("parse destroy response");
        assert!(!resp.is_released());
    }
}
