//! Binary resources (images) referenced from a page.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the bytes of a resource come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceSource {
    /// Base64 payload embedded in the page tree
    Inline(String),

    /// Object id to fetch from the document source
    Callback(String),
}

/// A resource the page body links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResource {
    /// Path relative to the page's directory, as linked from the body
    pub relative_path: String,

    /// Origin of the bytes
    pub source: ResourceSource,

    /// Image format reported by the source (e.g. "png")
    pub format: String,
}

impl PageResource {
    /// Create a resource reference.
    pub fn new(relative_path: impl Into<String>, source: ResourceSource, format: &str) -> Self {
        Self {
            relative_path: relative_path.into(),
            source,
            format: format.to_string(),
        }
    }

    /// Decode an inline payload. Returns `None` for callback resources.
    pub fn inline_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.source {
            ResourceSource::Inline(ref data) => {
                let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
                Ok(Some(bytes))
            }
            ResourceSource::Callback(_) => Ok(None),
        }
    }

    /// Check if the payload is embedded.
    pub fn is_inline(&self) -> bool {
        matches!(self.source, ResourceSource::Inline(_))
    }
}

/// File extension for a source image format.
pub fn extension_for_format(format: &str) -> &'static str {
    match format.trim().to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "jpg",
        "gif" => "gif",
        "bmp" => "bmp",
        "tif" | "tiff" => "tiff",
        "emf" => "emf",
        "wmf" => "wmf",
        "svg" => "svg",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_bytes() {
        let res = PageResource::new(
            "Page_files/image1.png",
            ResourceSource::Inline("aGVs\nbG8=".to_string()),
            "png",
        );
        assert!(res.is_inline());
        assert_eq!(res.inline_bytes().unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn test_inline_bytes_invalid() {
        let res = PageResource::new("x.png", ResourceSource::Inline("!!".to_string()), "png");
        assert!(res.inline_bytes().is_err());
    }

    #[test]
    fn test_callback_has_no_inline_bytes() {
        let res = PageResource::new("x.png", ResourceSource::Callback("{id}".to_string()), "png");
        assert_eq!(res.inline_bytes().unwrap(), None);
    }

    #[test]
    fn test_extension_for_format() {
        assert_eq!(extension_for_format("JPEG"), "jpg");
        assert_eq!(extension_for_format("png"), "png");
        assert_eq!(extension_for_format("unknown"), "png");
    }
}
