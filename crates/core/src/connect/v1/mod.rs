pub mod certificates;
pub mod devices;
pub mod profiles;

use serde::{Deserialize, Serialize};

/// JSON:API error envelope returned by every v1 endpoint on failure.
#[derive(Deserialize, Debug)]
pub struct V1ErrorResponse {
    pub errors: Vec<V1ErrorDetail>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct V1ErrorDetail {
    pub code: String,
    pub status: String,
    pub id: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl V1ErrorDetail {
    pub fn to_error(&self, url: String) -> crate::Error {
        let message = self
            .detail
            .clone()
            .or(self.title.clone())
            .unwrap_or_else(|| "Unknown API error".to_string());

        crate::Error::Api {
            url,
            code: self.code.clone(),
            status: self.status.parse().ok(),
            message,
        }
    }
}

/// A `{"type": ..., "id": ...}` linkage object, as used inside
/// relationship payloads.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceRef {
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}
