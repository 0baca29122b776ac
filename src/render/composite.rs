use std::sync::Arc;

use image::RgbaImage;

use crate::{
    assets::{FrameAsset, decode},
    config::BatchConfig,
    error::{FailureCause, FramerResult},
    geometry::{BandLayout, fit_within},
    handle::{HandleKind, HandleRegistry, RenderHandle},
    render::surface::Surface,
};

/// A frame decoded to pixels, shared read-only by every photo in a run.
#[derive(Clone, Debug)]
pub struct LoadedFrame {
    pixels: Arc<RgbaImage>,
}

impl LoadedFrame {
    pub fn load(frame: &FrameAsset) -> FramerResult<Self> {
        Self::from_bytes(frame.bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> FramerResult<Self> {
        Ok(Self::from_pixels(decode::decode_frame(bytes)?))
    }

    pub fn from_pixels(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
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
}

/// A finished photo: JPEG bytes plus the handle used to display it.
#[derive(Debug)]
pub struct FramedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Arc<[u8]>,
    pub handle: RenderHandle,
}

/// Paints `source` and the frame bands onto a new surface sized by
/// `config.max_dimension`.
///
/// The photo is stretched into the target box. The frame's header goes on
/// top, its footer at the bottom, and the middle band is stretched over
/// whatever is left between them.
pub fn render_framed(
    source: &RgbaImage,
    frame: &LoadedFrame,
    config: &BatchConfig,
) -> Result<Surface, FailureCause> {
    let (target_w, target_h) = fit_within(source.width(), source.height(), config.max_dimension);
    let mut surface = Surface::allocate(target_w, target_h)?;

    surface.draw_stretched(source, 0, 0, target_w, target_h);

    let layout = BandLayout::compute(frame.width(), frame.height(), target_w, target_h);
    let bands = [Some(layout.header), Some(layout.footer), layout.middle];
    for band in bands.into_iter().flatten().filter(|b| b.is_drawable()) {
        surface.draw_rows(
            frame.pixels(),
            band.src_y,
            band.src_h,
            band.dst_y,
            target_w,
            band.dst_h,
        );
    }

    Ok(surface)
}

/// Decode, frame and encode one photo.
#[tracing::instrument(skip_all, fields(source_bytes = source_bytes.len()))]
pub fn compose(
    source_bytes: &[u8],
    frame: &LoadedFrame,
    config: &BatchConfig,
    registry: &HandleRegistry,
) -> Result<FramedImage, FailureCause> {
    let source = decode::decode_rgba(source_bytes)?;
    let surface = render_framed(&source, frame, config)?;
    let jpeg = surface.encode_jpeg(config.jpeg_quality())?;

    tracing::debug!(
        width = surface.width(),
        height = surface.height(),
        jpeg_bytes = jpeg.len(),
        "composited"
    );

    Ok(FramedImage {
        width: surface.width(),
        height: surface.height(),
        jpeg: Arc::from(jpeg),
        handle: registry.acquire(HandleKind::Output),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::Rgba;

    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const PHOTO: [u8; 4] = [90, 90, 90, 255];

    /// Frame whose header rows are red, footer rows blue, and middle rows
    /// transparent except for a green one-pixel border on the left.
    fn striped_frame(w: u32, h: u32) -> LoadedFrame {
        let band = (f64::from(h) * 0.2).round() as u32;
        let img = RgbaImage::from_fn(w, h, |x, y| {
            if y < band {
                Rgba(RED)
            } else if y >= h - band {
                Rgba(BLUE)
            } else if x == 0 {
                Rgba(GREEN)
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        LoadedFrame::from_pixels(img)
    }

    fn photo(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(PHOTO))
    }

    fn cfg(max_dimension: u32) -> BatchConfig {
        BatchConfig {
            max_dimension,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn output_keeps_native_size_and_places_bands() {
        let frame = striped_frame(100, 100);
        let surface = render_framed(&photo(80, 60), &frame, &cfg(2500)).unwrap();
        assert_eq!((surface.width(), surface.height()), (80, 60));

        // scale 0.8: header rows 0..16, footer rows 44..60, middle 16..44.
        let px = |x, y| surface.pixels().get_pixel(x, y).0;
        assert_eq!(px(40, 2), RED);
        assert_eq!(px(40, 57), BLUE);
        assert_eq!(px(40, 30), PHOTO);
        assert_eq!(px(79, 30), PHOTO);
    }

    #[test]
    fn transparent_frame_edges_do_not_darken_the_photo() {
        // White on the left, fully transparent black on the right.
        let frame = LoadedFrame::from_pixels(RgbaImage::from_fn(2, 10, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }));
        let white = RgbaImage::from_pixel(40, 200, Rgba([255, 255, 255, 255]));
        let surface = render_framed(&white, &frame, &cfg(2500)).unwrap();

        let darkest = surface
            .pixels()
            .pixels()
            .flat_map(|px| px.0[..3].to_vec())
            .min()
            .unwrap();
        // Float blending in `overlay` may land one step under 255.
        assert!(darkest >= 254, "darkest channel {darkest}");
    }

    #[test]
    fn oversized_photos_shrink_to_the_limit() {
        let frame = striped_frame(10, 10);
        let surface = render_framed(&photo(400, 200), &frame, &cfg(250)).unwrap();
        assert_eq!((surface.width(), surface.height()), (250, 125));
    }

    #[test]
    fn tall_frame_on_short_photo_skips_the_middle() {
        // Bands scale to 0.2 * 200 * 4 = 160 rows each; together more than 300.
        let frame = striped_frame(50, 200);
        let surface = render_framed(&photo(200, 300), &frame, &cfg(2500)).unwrap();
        let px = |x, y| surface.pixels().get_pixel(x, y).0;
        assert_eq!(px(100, 0), RED);
        assert_eq!(px(100, 299), BLUE);
        // Footer is drawn after the header, so it wins where they overlap.
        assert_eq!(px(100, 150), BLUE);
        assert!(surface.pixels().pixels().all(|p| p.0 != GREEN && p.0 != PHOTO));
    }

    #[test]
    fn compose_round_trips_through_jpeg() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(photo(64, 48))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let registry = HandleRegistry::new();
        let out = compose(&png, &striped_frame(32, 32), &cfg(2500), &registry).unwrap();
        assert_eq!((out.width, out.height), (64, 48));
        assert_eq!(out.handle.kind(), HandleKind::Output);
        assert_eq!(registry.live(), 1);

        let decoded = image::load_from_memory(&out.jpeg).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(image::guess_format(&out.jpeg).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn compose_reports_decode_failures() {
        let registry = HandleRegistry::new();
        let err = compose(b"nope", &striped_frame(4, 4), &cfg(2500), &registry).unwrap_err();
        assert!(matches!(err, FailureCause::Decode(_)));
        assert_eq!(registry.live(), 0);
    }
}
