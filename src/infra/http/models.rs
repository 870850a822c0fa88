use serde::{Deserialize, Serialize};

use crate::application::error::ConversionError;

/// Body of `POST /convert` and `POST /download`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConvertPayload {
    pub markdown: String,
    pub theme: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConvertResponse {
    pub fn rendered(html: impl Into<String>) -> Self {
        Self {
            success: true,
            html: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn failed(err: &ConversionError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            category: Some(err.category().to_string()),
            hint: err.hint().map(str::to_string),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub success: bool,
    pub content: String,
    pub filename: String,
}
