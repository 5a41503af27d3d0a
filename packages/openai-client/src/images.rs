//! Image generation request and response types.

use serde::{Deserialize, Serialize};

/// Image generation request (`POST /images/generations`).
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    /// Model to use (e.g., "dall-e-3")
    pub model: String,

    /// Prompt describing the image
    pub prompt: String,

    /// Number of images; dall-e-3 only supports 1
    pub n: u8,

    /// Size string such as "1024x1024" or "1024x1792"
    pub size: String,

    /// "standard" or "hd"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// "vivid" or "natural"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl ImageRequest {
    /// Create a square single-image request.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: None,
            style: None,
        }
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// A generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Temporary URL of the rendered image
    pub url: String,

    /// Prompt as rewritten by the provider, if it rewrote it
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageResponseRaw {
    pub data: Vec<ImageDataRaw>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageDataRaw {
    pub url: Option<String>,
    pub revised_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_serialization() {
        let req = ImageRequest::new("dall-e-3", "A teapot on a table")
            .size("1024x1792")
            .quality("hd")
            .style("vivid");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["n"], 1);
        assert_eq!(body["size"], "1024x1792");
        assert_eq!(body["quality"], "hd");
        assert_eq!(body["style"], "vivid");
    }

    #[test]
    fn test_optional_flags_omitted() {
        let body = serde_json::to_value(ImageRequest::new("dall-e-3", "x")).unwrap();
        assert!(body.get("quality").is_none());
        assert!(body.get("style").is_none());
        assert_eq!(body["size"], "1024x1024");
    }

    #[test]
    fn test_raw_response_parse() {
        let raw: ImageResponseRaw = serde_json::from_str(
            r#"{"created": 1, "data": [{"url": "https://img/1.png", "revised_prompt": "better"}]}"#,
        )
        .unwrap();
        assert_eq!(raw.data[0].url.as_deref(), Some("https://img/1.png"));
        assert_eq!(raw.data[0].revised_prompt.as_deref(), Some("better"));
    }
}
