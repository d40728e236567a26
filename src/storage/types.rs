//! Types for storage operations

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Response of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `<bucket>/<path>` of the stored object
    #[serde(rename = "Key")]
    pub key: String,

    /// Object id, returned by recent storage versions
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

/// A file in a storage bucket, as returned by delete and list calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    /// The file name
    pub name: String,

    /// The bucket ID
    pub bucket_id: Option<String>,

    /// The file ID
    pub id: Option<String>,

    /// Creation timestamp
    pub created_at: Option<String>,
}

/// Options for uploading a file
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Cache control header
    pub cache_control: Option<String>,

    /// Content type header
    pub content_type: Option<String>,

    /// Whether to overwrite an existing object
    pub upsert: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            cache_control: Some("3600".to_string()),
            content_type: None,
            upsert: false,
        }
    }
}

impl FileOptions {
    /// Set the content type
    pub fn with_content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }

    /// Overwrite an existing object
    pub fn with_upsert(mut self, value: bool) -> Self {
        self.upsert = value;
        self
    }
}

/// An image picked by the user, ready to upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,

    /// MIME type
    pub content_type: String,

    /// Raw bytes
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Create an upload from raw bytes
    pub fn new(file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        }
    }

    /// Decode a `data:<mime>;base64,<payload>` URL as produced by file pickers
    pub fn from_data_url(file_name: &str, data_url: &str) -> Result<Self, Error> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| Error::storage("not a data URL"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::storage("data URL has no payload"))?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::storage("only base64 data URLs are supported"))?;

        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| Error::storage(format!("invalid base64 payload: {}", e)))?;

        Ok(Self::new(file_name, content_type, data))
    }

    /// Read an image from disk, guessing its type from the extension
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::storage(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let content_type = content_type_for(&file_name).to_string();

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    /// Extension to store the object under
    pub fn extension(&self) -> &str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => Path::new(&self.file_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("bin"),
        }
    }
}

/// MIME type for a file name, defaulting to a binary stream
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_url() {
        let upload = ImageUpload::from_data_url("a.png", "data:image/png;base64,iVBORw0K").unwrap();
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.data, vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);
        assert_eq!(upload.extension(), "png");
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert!(ImageUpload::from_data_url("a.svg", "data:image/svg+xml,<svg/>").is_err());
        assert!(ImageUpload::from_data_url("a.png", "https://x/a.png").is_err());
    }

    #[test]
    fn extension_falls_back_to_file_name() {
        let upload = ImageUpload::new("photo.HEIC", "image/heic", vec![]);
        assert_eq!(upload.extension(), "HEIC");
        assert_eq!(content_type_for("IMG_1.JPG"), "image/jpeg");
    }
}
