use image::{ExtendedColorType, ImageEncoder as _, RgbaImage, imageops};

use crate::error::FailureCause;

/// Largest drawing surface we agree to allocate (16384 x 16384).
pub const MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

const SMOOTHING: imageops::FilterType = imageops::FilterType::Lanczos3;

/// Straight-alpha RGBA8 drawing target. Starts fully transparent.
#[derive(Clone, Debug)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn allocate(width: u32, height: u32) -> Result<Self, FailureCause> {
        if width == 0 || height == 0 {
            return Err(FailureCause::surface(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            return Err(FailureCause::surface(format!(
                "{width}x{height} exceeds the {MAX_SURFACE_PIXELS} pixel limit"
            )));
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Resamples all of `src` into the `dst_w` x `dst_h` box at `(dst_x, dst_y)`
    /// and blends it source-over. Parts outside the surface are clipped; a box
    /// with no area draws nothing.
    pub fn draw_stretched(
        &mut self,
        src: &RgbaImage,
        dst_x: i64,
        dst_y: i64,
        dst_w: u32,
        dst_h: u32,
    ) {
        if dst_w == 0 || dst_h == 0 || src.width() == 0 || src.height() == 0 {
            return;
        }
        if src.dimensions() == (dst_w, dst_h) {
            imageops::overlay(&mut self.pixels, src, dst_x, dst_y);
        } else if src.pixels().all(|px| px[3] == u8::MAX) {
            let resized = imageops::resize(src, dst_w, dst_h, SMOOTHING);
            imageops::overlay(&mut self.pixels, &resized, dst_x, dst_y);
        } else {
            // Filter taps must not pull in the color of fully transparent pixels.
            let mut premul = src.clone();
            premultiply_rgba8_in_place(&mut premul);
            let mut resized = imageops::resize(&premul, dst_w, dst_h, SMOOTHING);
            unpremultiply_rgba8_in_place(&mut resized);
            imageops::overlay(&mut self.pixels, &resized, dst_x, dst_y);
        }
    }

    /// Like [`Surface::draw_stretched`] for the full-width row range
    /// `src_y..src_y + src_h` of `src`.
    pub fn draw_rows(
        &mut self,
        src: &RgbaImage,
        src_y: u32,
        src_h: u32,
        dst_y: i64,
        dst_w: u32,
        dst_h: u32,
    ) {
        let src_y = src_y.min(src.height());
        let src_h = src_h.min(src.height() - src_y);
        if src_h == 0 {
            return;
        }
        let rows = imageops::crop_imm(src, 0, src_y, src.width(), src_h).to_image();
        self.draw_stretched(&rows, 0, dst_y, dst_w, dst_h);
    }

    /// Encodes as baseline JPEG. Transparent areas become black, the way a
    /// browser canvas flattens before JPEG export.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, FailureCause> {
        let rgb = flatten_over_black(self.pixels.as_raw());

        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .write_image(&rgb, self.width(), self.height(), ExtendedColorType::Rgb8)
            .map_err(|e| FailureCause::encode(e.to_string()))?;

        if out.is_empty() {
            return Err(FailureCause::encode("encoder produced no bytes"));
        }
        Ok(out)
    }
}

fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        rgb.extend([
            mul_div255(u16::from(px[0]), a),
            mul_div255(u16::from(px[1]), a),
            mul_div255(u16::from(px[2]), a),
        ]);
    }
    rgb
}

fn premultiply_rgba8_in_place(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = u16::from(px[3]);
        for c in 0..3 {
            px[c] = mul_div255(u16::from(px[c]), a);
        }
    }
}

/// Inverse of [`premultiply_rgba8_in_place`]. Ringing can leave a channel
/// above its alpha; those saturate at 255.
fn unpremultiply_rgba8_in_place(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = u32::from(px[3]);
        for c in 0..3 {
            px[c] = if a == 0 {
                0
            } else {
                ((u32::from(px[c]) * 255 + a / 2) / a).min(255) as u8
            };
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
