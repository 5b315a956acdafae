use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use tracing::debug;

/// A food photo picked by the user, ready for `/analyze-image`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub body: Bytes,
    pub content_type: &'static str,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_from_file_name(&file_name);
        Self {
            file_name,
            body: body.into(),
            content_type,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let body = tokio::fs::read(path)
            .await
            .with_context(|| format!("read image {}", path.display()))?;
        anyhow::ensure!(!body.is_empty(), "image {} is empty", path.display());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        let upload = Self::new(file_name, body);
        debug!(
            file = %upload.file_name,
            content_type = upload.content_type,
            bytes = upload.body.len(),
            "image selected"
        );
        Ok(upload)
    }
}

fn mime_from_file_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
