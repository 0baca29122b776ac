use std::path::Path;

use anyhow::Context as _;

use crate::error::FramerResult;

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A user-supplied file: display name, declared MIME type and raw bytes.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads `path`, naming the file after its final component and deriving
    /// the MIME type from the extension.
    pub fn from_path(path: &Path) -> FramerResult<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            mime: mime_for_path(path).to_string(),
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}
