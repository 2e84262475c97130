//! Image payloads as they arrive from the browser or the CLI.

use std::path::Path;

use base64::Engine;

use super::backend::OcrError;

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Base64 image data with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Standard base64, no data-URL prefix.
    pub base64: String,
    /// MIME type such as `image/png`.
    pub media_type: String,
}

impl ImagePayload {
    /// Parse a data URL (`data:image/png;base64,...`) or bare base64.
    ///
    /// The media type comes from the data-URL prefix when present, otherwise
    /// it is sniffed from the decoded bytes, falling back to JPEG.
    pub fn parse(input: &str) -> Result<Self, OcrError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(OcrError::InvalidImage("缺少图片数据".to_string()));
        }

        let (prefix, data) = match input.split_once("base64,") {
            Some((prefix, data)) => (Some(prefix), data),
            None => (None, input),
        };

        let data: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| OcrError::InvalidImage(format!("base64 decode failed: {}", e)))?;
        if bytes.is_empty() {
            return Err(OcrError::InvalidImage("缺少图片数据".to_string()));
        }

        let media_type = prefix
            .and_then(media_type_from_prefix)
            .or_else(|| sniff_image_type(&bytes))
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        Ok(Self {
            base64: data,
            media_type,
        })
    }

    /// Build a payload from raw file bytes, using the path as a type hint.
    pub fn from_bytes(bytes: &[u8], path_hint: Option<&Path>) -> Result<Self, OcrError> {
        if bytes.is_empty() {
            return Err(OcrError::InvalidImage("empty image file".to_string()));
        }

        let media_type = sniff_image_type(bytes)
            .or_else(|| {
                path_hint
                    .and_then(|p| mime_guess::from_path(p).first())
                    .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                    .map(|m| m.essence_str().to_string())
            })
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        Ok(Self {
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type,
        })
    }

    /// Render as a data URL for OpenAI-style `image_url` parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

/// Extract `image/png` from `data:image/png;`.
fn media_type_from_prefix(prefix: &str) -> Option<String> {
    let rest = prefix.trim().strip_prefix("data:")?;
    let media_type = rest.split(';').next()?.trim();
    if media_type.starts_with("image/") {
        Some(media_type.to_lowercase())
    } else {
        None
    }
}

fn sniff_image_type(bytes: &[u8]) -> Option<String> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type().to_string())
}
