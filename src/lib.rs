pub mod codec;
pub mod plan;
pub mod resample;
pub mod source;
pub mod utils;

pub use codec::{CodecHeader, DecodeConfig, JpegCodec, OutputLayout, ScanlineCodec, SourceColor};
pub use plan::{ScalePlan, MAX_SCALE_DENOMINATOR};
pub use source::MemSource;
pub use utils::error::{ThumbError, ThumbResult};
pub use utils::info_display::ThumbInfo;
pub use utils::writer::Writer;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Output color interpretation for decoded pixels.
///
/// `Gray8` and `Cmyk` are detected from the source header and cannot be
/// selected. The remaining variants can be requested before decode;
/// rasters stay in R,G,B storage order and packed fetches keep their
/// fixed layout whichever is selected. `Yuv8` decodes as interleaved RGB
/// on this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray8,
    Yuv8,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Argb32,
    Cmyk,
}

impl ColorSpace {
    /// Channels per pixel a raster in this color space carries.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::Gray8 => 1,
            ColorSpace::Rgba8 | ColorSpace::Bgra8 | ColorSpace::Argb32 | ColorSpace::Cmyk => 4,
            _ => 3,
        }
    }

    fn selectable(&self) -> bool {
        !matches!(self, ColorSpace::Gray8 | ColorSpace::Cmyk)
    }
}

// Decoded pixel storage. Width and height stay at the decode dimensions
// after resampling, shrunk rows keep the decode stride.
struct Raster {
    data: Vec<u8>,
    width: u32,
    height: u32,
    components: usize,
}

impl Raster {
    fn stride(&self) -> usize {
        self.width as usize * self.components
    }
}

/// A one-shot thumbnail pipeline over a single image.
///
/// Opening reads the header only. The first pixel fetch decodes at the
/// planned reduction, shrinks the raster in place to the exact output
/// rectangle and packs ARGB words. A failed decode poisons the handle,
/// later decode and resample calls report the failure again.
pub struct Thumb<C: ScanlineCodec> {
    codec: C,
    in_w: u32,
    in_h: u32,
    color_space: ColorSpace,
    plan: ScalePlan,
    raster: Option<Raster>,
    comment: Option<String>,
    thumb_marker: Option<Vec<u8>>,
    decoded: bool,
    scaled: bool,
    fatal: bool,
}

/// Thumbnail pipeline over a file on disk.
pub type FileThumb = Thumb<JpegCodec<BufReader<File>>>;
/// Thumbnail pipeline over an in-memory buffer.
pub type MemThumb<'a> = Thumb<JpegCodec<MemSource<'a>>>;

impl Thumb<JpegCodec<BufReader<File>>> {
    pub fn open<P: AsRef<Path>>(path: P) -> ThumbResult<FileThumb> {
        let file = File::open(path)?;

        Thumb::from_codec(JpegCodec::new(BufReader::new(file))?)
    }
}

impl<'a> Thumb<JpegCodec<MemSource<'a>>> {
    pub fn from_memory(data: &'a [u8]) -> ThumbResult<MemThumb<'a>> {
        Thumb::from_codec(JpegCodec::new(MemSource::new(data))?)
    }
}

impl<C: ScanlineCodec> Thumb<C> {
    /// Reads the header through the codec and seeds a full-size plan.
    pub fn from_codec(mut codec: C) -> ThumbResult<Thumb<C>> {
        let header = codec.read_header()?;

        if header.width < 1 || header.height < 1 {
            return Err(ThumbError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }

        let color_space = match header.color {
            SourceColor::Grayscale => ColorSpace::Gray8,
            SourceColor::Cmyk => ColorSpace::Cmyk,
            SourceColor::Color => ColorSpace::Rgb8,
        };

        let comment = header
            .comment
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        log_debug!("Opened {}x{} {:?} image", header.width, header.height, color_space);

        Ok(Thumb {
            codec,
            in_w: header.width,
            in_h: header.height,
            color_space,
            plan: ScalePlan::new(header.width, header.height, header.width, header.height),
            raster: None,
            comment,
            thumb_marker: header.thumb_marker,
            decoded: false,
            scaled: false,
            fatal: false,
        })
    }

    /// Source dimensions from the header.
    pub fn size(&self) -> (u32, u32) {
        (self.in_w, self.in_h)
    }

    /// Planned output rectangle.
    pub fn output_size(&self) -> (u32, u32) {
        (self.plan.out_w, self.plan.out_h)
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn scale_denominator(&self) -> u8 {
        self.plan.denominator
    }

    /// Comment captured from the source, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Raw thumbnail marker payload captured from the source, if any.
    pub fn thumbnail_marker(&self) -> Option<&[u8]> {
        self.thumb_marker.as_deref()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    /// Bounds the output rectangle. Rejected once decoding has run.
    pub fn set_decode_size(&mut self, width: u32, height: u32) -> ThumbResult<()> {
        if self.decoded {
            return Err(ThumbError::AlreadyDecoded);
        }

        self.plan = ScalePlan::new(self.in_w, self.in_h, width, height);

        log_debug!(
            "Requested {}x{}, planned {}x{} at 1/{}",
            width,
            height,
            self.plan.out_w,
            self.plan.out_h,
            self.plan.denominator
        );

        Ok(())
    }

    /// Overrides the output color space. Rejected once decoding has run.
    ///
    /// Grayscale and CMYK sources keep their detected space, an override
    /// request against them is logged and ignored.
    pub fn set_color_space(&mut self, space: ColorSpace) -> ThumbResult<()> {
        if self.decoded {
            return Err(ThumbError::AlreadyDecoded);
        }

        if !space.selectable() {
            return Err(ThumbError::Unsupported(format!(
                "{:?} is detected from the source, not selectable",
                space
            )));
        }

        if matches!(self.color_space, ColorSpace::Gray8 | ColorSpace::Cmyk) {
            log_warn!("Source is {:?}, ignoring requested {:?}", self.color_space, space);
            return Ok(());
        }

        self.color_space = space;

        Ok(())
    }

    /// Runs the scanline decode into a fresh raster at the codec's reduced
    /// dimensions. A failure aborts the codec and poisons the handle.
    pub fn decode(&mut self) -> ThumbResult<()> {
        if self.fatal {
            return Err(ThumbError::HandleFailed);
        }

        if self.decoded {
            return Ok(());
        }

        match self.decode_scanlines() {
            Ok(raster) => {
                self.raster = Some(raster);
                self.decoded = true;

                Ok(())
            }
            Err(error) => {
                // No partial raster survives a failed decode.
                self.codec.abort();
                self.raster = None;
                self.fatal = true;

                Err(error)
            }
        }
    }

    fn decode_scanlines(&mut self) -> ThumbResult<Raster> {
        let config = DecodeConfig {
            scale_num: 1,
            scale_denom: self.plan.denominator,
            color_space: self.color_space,
            fast_dct: true,
            fancy_upsampling: false,
            block_smoothing: false,
        };

        let layout = self.codec.configure(&config)?;

        if layout.width < 1 || layout.height < 1 || layout.components < 1 {
            return Err(ThumbError::CodecError(format!(
                "Degenerate decode layout {}x{} with {} components",
                layout.width, layout.height, layout.components
            )));
        }

        let stride = layout.stride();
        let total = stride * layout.height as usize;

        let mut data: Vec<u8> = Vec::new();
        if data.try_reserve_exact(total).is_err() {
            return Err(ThumbError::AllocationFailed { bytes: total });
        }
        data.resize(total, 0);

        self.codec.start()?;

        // Every pass must advance the scanline counter, anything else is
        // a stalled decoder.
        while self.codec.output_scanline() < layout.height {
            let before = self.codec.output_scanline();
            let offset = before as usize * stride;

            self.codec.read_scanlines(&mut data[offset..])?;

            if self.codec.output_scanline() == before {
                return Err(ThumbError::Stall { scanline: before });
            }
        }

        self.codec.finish()?;

        Ok(Raster {
            data,
            width: layout.width,
            height: layout.height,
            components: layout.components,
        })
    }

    /// Shrinks the decoded raster in place to the planned rectangle.
    /// Later calls are no-ops.
    pub fn resample(&mut self) -> ThumbResult<()> {
        if self.fatal {
            return Err(ThumbError::HandleFailed);
        }

        if self.scaled {
            return Ok(());
        }

        let raster = match self.raster.as_mut() {
            Some(raster) => raster,
            None => {
                log_debug!("No raster to resample");
                return Ok(());
            }
        };

        if self.plan.out_w < 1 || self.plan.out_h < 1 {
            return Ok(());
        }

        if raster.width < self.plan.out_w || raster.height < self.plan.out_h {
            log_warn!(
                "Decoded raster {}x{} smaller than planned {}x{}, clamping",
                raster.width,
                raster.height,
                self.plan.out_w,
                self.plan.out_h
            );
            self.plan.out_w = self.plan.out_w.min(raster.width);
            self.plan.out_h = self.plan.out_h.min(raster.height);
        }

        if raster.width == self.plan.out_w && raster.height == self.plan.out_h {
            self.scaled = true;
            return Ok(());
        }

        resample::resample_nearest(
            &mut raster.data,
            raster.width,
            raster.height,
            raster.components,
            self.plan.out_w,
            self.plan.out_h,
        );
        self.scaled = true;

        Ok(())
    }

    // Decode and resample on demand. Failures surface as an absent raster.
    fn ensure_raster(&mut self) -> Option<(u32, u32)> {
        if let Err(error) = self.decode() {
            log_warn!("Decode failed: {}", error);
            return None;
        }

        if let Err(error) = self.resample() {
            log_warn!("Resample failed: {}", error);
            return None;
        }

        Some((self.plan.out_w, self.plan.out_h))
    }

    /// Packed ARGB pixels of the finished thumbnail, row major from the top.
    /// Decodes and resamples on demand, `None` when either failed.
    pub fn pixels(&mut self) -> Option<Vec<u32>> {
        let (out_w, out_h) = self.ensure_raster()?;

        self.pack_region(0, 0, out_w, out_h)
    }

    /// Packed ARGB pixels of a window of the finished thumbnail. The window
    /// is clamped to the output rectangle, a window fully outside it or with
    /// a zero side yields `None`.
    pub fn pixels_region(&mut self, x: u32, y: u32, width: u32, height: u32) -> Option<Vec<u32>> {
        let (out_w, out_h) = self.ensure_raster()?;

        if x >= out_w || y >= out_h || width < 1 || height < 1 {
            return None;
        }

        let width = width.min(out_w - x);
        let height = height.min(out_h - y);

        self.pack_region(x, y, width, height)
    }

    fn pack_region(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Vec<u32>> {
        let raster = self.raster.as_ref()?;
        let stride = raster.stride();
        let total = width as usize * height as usize;

        let mut pixels: Vec<u32> = Vec::new();
        if pixels.try_reserve_exact(total).is_err() {
            log_warn!("Failed to allocate {} pixel words", total);
            return None;
        }

        for row in y..y + height {
            for col in x..x + width {
                let p = row as usize * stride + col as usize * raster.components;

                // Single-channel rasters replicate gray into all three.
                let (r, g, b) = if raster.components >= 3 {
                    (raster.data[p], raster.data[p + 1], raster.data[p + 2])
                } else {
                    (raster.data[p], raster.data[p], raster.data[p])
                };

                pixels.push(0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b));
            }
        }

        Some(pixels)
    }

    /// Snapshot of the handle state for display.
    pub fn info(&self) -> ThumbInfo {
        ThumbInfo {
            width: self.in_w,
            height: self.in_h,
            color_space: self.color_space,
            out_w: self.plan.out_w,
            out_h: self.plan.out_h,
            scale_denominator: self.plan.denominator,
            decoded: self.decoded,
            scaled: self.scaled,
            comment: self.comment.clone(),
            thumb_marker_len: self.thumb_marker.as_ref().map(|marker| marker.len()),
        }
    }
}
