/// Share of the frame height taken by the header band, and again by the footer band.
pub const BAND_FRACTION: f64 = 0.20;

/// Box a photo is resampled into: native size, or uniformly shrunk so that
/// neither side exceeds `max_dimension`.
///
/// The photo is stretched to fill this box exactly; no letterboxing.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let max = f64::from(max_dimension);
    let ratio = (max / f64::from(width)).min(max / f64::from(height));
    let scaled = |v: u32| ((f64::from(v) * ratio).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// One horizontal slice of the frame and where it lands in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub src_y: u32,
    pub src_h: u32,
    /// May be negative for the footer when the header and footer overlap.
    pub dst_y: i64,
    pub dst_h: u32,
}

impl Band {
    pub fn is_drawable(&self) -> bool {
        self.src_h > 0 && self.dst_h > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandLayout {
    pub target_width: u32,
    pub target_height: u32,
    pub header: Band,
    pub footer: Band,
    /// Only present when header and footer leave a positive gap.
    pub middle: Option<Band>,
}

impl BandLayout {
    /// Maps the frame's header/middle/footer bands onto a `target_width` x
    /// `target_height` output. The frame width is scaled to the target width;
    /// band heights follow that scale except the middle band, which absorbs
    /// whatever height remains.
    pub fn compute(
        frame_width: u32,
        frame_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        let frame_width = frame_width.max(1);
        let frame_height = frame_height.max(1);

        let band_src = f64::from(frame_height) * BAND_FRACTION;
        let band_src_px = (band_src.round() as u32).clamp(1, frame_height);

        let scale = f64::from(target_width) / f64::from(frame_width);
        let band_out_px = (band_src * scale).round() as u32;

        let header = Band {
            src_y: 0,
            src_h: band_src_px,
            dst_y: 0,
            dst_h: band_out_px,
        };
        let footer = Band {
            src_y: frame_height - band_src_px,
            src_h: band_src_px,
            dst_y: i64::from(target_height) - i64::from(band_out_px),
            dst_h: band_out_px,
        };

        let covered = u64::from(header.dst_h) + u64::from(footer.dst_h);
        let middle = (u64::from(target_height) > covered).then(|| {
            let (src_y, src_h) = middle_source_rows(frame_height, band_src_px);
            Band {
                src_y,
                src_h,
                dst_y: i64::from(header.dst_h),
                dst_h: target_height - header.dst_h - footer.dst_h,
            }
        });

        Self {
            target_width,
            target_height,
            header,
            footer,
            middle,
        }
    }

    /// Output rows the frame spans; always the full target height.
    pub fn covered_height(&self) -> u32 {
        match self.middle {
            Some(middle) => self.header.dst_h + middle.dst_h + self.footer.dst_h,
            None => self.target_height,
        }
    }
}

fn middle_source_rows(frame_height: u32, band_src_px: u32) -> (u32, u32) {
    let rest = frame_height.saturating_sub(band_src_px.saturating_mul(2));
    if rest > 0 {
        (band_src_px, rest)
    } else {
        // Frames a few pixels tall have no middle rows left; stretch the row at the seam.
        (band_src_px.min(frame_height - 1), 1)
    }
}
