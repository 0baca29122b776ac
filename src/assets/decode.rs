use image::RgbaImage;

use crate::error::{FailureCause, FramerError, FramerResult};

/// Decodes any format `image` recognises into straight-alpha RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, FailureCause> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| FailureCause::decode(e.to_string()))?;
    let rgba = dyn_img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(FailureCause::decode("image has zero width or height"));
    }
    Ok(rgba)
}

/// Decodes the frame once per batch. Unlike photos, a bad frame fails the
/// whole run.
pub fn decode_frame(bytes: &[u8]) -> FramerResult<RgbaImage> {
    decode_rgba(bytes).map_err(|cause| FramerError::decode(format!("frame: {cause}")))
}
