pub mod decode;
pub mod input;

use crate::{
    error::FailureCause,
    handle::{HandleKind, HandleRegistry, RenderHandle},
    render::FramedImage,
};

pub use input::InputFile;

/// Lifecycle tag of a photo: `Pending -> Processing -> Completed | Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Pending,
    Processing,
    Completed,
    #[serde(rename = "error")]
    Failed,
}

#[derive(Debug)]
pub enum ImageState {
    Pending,
    Processing,
    Completed(FramedImage),
    Failed(FailureCause),
}

impl ImageState {
    pub fn status(&self) -> ImageStatus {
        match self {
            Self::Pending => ImageStatus::Pending,
            Self::Processing => ImageStatus::Processing,
            Self::Completed(_) => ImageStatus::Completed,
            Self::Failed(_) => ImageStatus::Failed,
        }
    }
}

/// One photo in the batch. Owns its bytes and preview handle until removed.
#[derive(Debug)]
pub struct SourceImage {
    id: String,
    name: String,
    bytes: Vec<u8>,
    preview: RenderHandle,
    state: ImageState,
}

impl SourceImage {
    pub(crate) fn new(id: String, file: InputFile, registry: &HandleRegistry) -> Self {
        Self {
            id,
            name: file.name,
            bytes: file.bytes,
            preview: registry.acquire(HandleKind::Preview),
            state: ImageState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> &RenderHandle {
        &self.preview
    }

    pub fn state(&self) -> &ImageState {
        &self.state
    }

    pub fn status(&self) -> ImageStatus {
        self.state.status()
    }

    pub fn output(&self) -> Option<&FramedImage> {
        match &self.state {
            ImageState::Completed(out) => Some(out),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureCause> {
        match &self.state {
            ImageState::Failed(cause) => Some(cause),
            _ => None,
        }
    }

    /// The handle a gallery should show: the framed result once available.
    pub fn display_handle(&self) -> &RenderHandle {
        self.output().map_or(&self.preview, |out| &out.handle)
    }

    pub(crate) fn set_state(&mut self, state: ImageState) {
        self.state = state;
    }
}

/// The decorative overlay shared by every photo in a batch. Read-only once set.
#[derive(Debug)]
pub struct FrameAsset {
    name: String,
    bytes: Vec<u8>,
    preview: RenderHandle,
}

impl FrameAsset {
    pub(crate) fn new(file: InputFile, registry: &HandleRegistry) -> Self {
        Self {
            name: file.name,
            bytes: file.bytes,
            preview: registry.acquire(HandleKind::Frame),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> &RenderHandle {
        &self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_images_start_pending_with_a_preview() {
        let registry = HandleRegistry::new();
        let img = SourceImage::new(
            "img-1".to_string(),
            InputFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]),
            &registry,
        );
        assert_eq!(img.status(), ImageStatus::Pending);
        assert_eq!(img.preview().kind(), HandleKind::Preview);
        assert_eq!(img.display_handle().id(), img.preview().id());
        assert!(img.output().is_none());
        assert_eq!(registry.live(), 1);
        drop(img);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn failed_state_keeps_its_cause() {
        let registry = HandleRegistry::new();
        let mut img = SourceImage::new(
            "img-1".to_string(),
            InputFile::new("a.jpg", "image/jpeg", vec![]),
            &registry,
        );
        img.set_state(ImageState::Failed(FailureCause::decode("truncated")));
        assert_eq!(img.status(), ImageStatus::Failed);
        assert_eq!(img.failure(), Some(&FailureCause::decode("truncated")));
    }

    #[test]
    fn statuses_serialize_with_their_wire_names() {
        let names: Vec<_> = [
            ImageStatus::Pending,
            ImageStatus::Processing,
            ImageStatus::Completed,
            ImageStatus::Failed,
        ]
        .into_iter()
        .map(|s| serde_json::to_value(s).unwrap())
        .collect();
        assert_eq!(names, ["pending", "processing", "completed", "error"]);
    }
}
