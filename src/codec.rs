use std::io::{Read, Seek, SeekFrom};

use jpeg_decoder::{Decoder, PixelFormat};

use crate::log_debug;
use crate::utils::error::{ThumbError, ThumbResult};
use crate::ColorSpace;

/// Largest comment payload retained from a source image.
pub const MAX_COMMENT_BYTES: usize = 65535;
/// Largest thumbnail marker payload retained from a source image.
pub const MAX_THUMB_MARKER_BYTES: usize = 1024;

// Rows handed out per read_scanlines call.
const SCANLINE_CHUNK: u32 = 4;

/// Color layout of the source image, as detected from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColor {
    Grayscale,
    Cmyk,
    Color,
}

/// Everything the header pass learns about a source image.
#[derive(Debug, Clone)]
pub struct CodecHeader {
    pub width: u32,
    pub height: u32,
    pub color: SourceColor,
    pub comment: Option<Vec<u8>>,
    pub thumb_marker: Option<Vec<u8>>,
}

/// Decode parameters fixed before the first scanline is produced.
#[derive(Debug, Clone, Copy)]
pub struct DecodeConfig {
    pub scale_num: u8,
    pub scale_denom: u8,
    pub color_space: ColorSpace,
    pub fast_dct: bool,
    pub fancy_upsampling: bool,
    pub block_smoothing: bool,
}

/// Dimensions and pixel layout of the decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    pub width: u32,
    pub height: u32,
    pub components: usize,
}

impl OutputLayout {
    pub fn stride(&self) -> usize {
        self.width as usize * self.components
    }
}

/// A decoder that yields pixel rows top to bottom at a reduced scale.
///
/// The call order is fixed: `read_header` once, `configure` once, `start`,
/// then `read_scanlines` until `output_scanline` reaches the layout height,
/// then `finish`. `abort` may be called at any point after `start` to tear
/// the decode down; the codec must release any frame state it holds.
///
/// `read_scanlines` writes whole rows at the layout stride and returns the
/// number of rows produced. Returning zero rows while rows remain is a
/// stall, and callers treat it as fatal.
///
/// Rasters are served with gray in byte zero, or R, G and B in bytes zero
/// through two, whatever byte order the configuration selects. Backends
/// whose native output differs reorder before serving rows.
pub trait ScanlineCodec {
    fn read_header(&mut self) -> ThumbResult<CodecHeader>;
    fn configure(&mut self, config: &DecodeConfig) -> ThumbResult<OutputLayout>;
    fn start(&mut self) -> ThumbResult<()>;
    fn output_scanline(&self) -> u32;
    fn read_scanlines(&mut self, into: &mut [u8]) -> ThumbResult<u32>;
    fn finish(&mut self) -> ThumbResult<()>;
    fn abort(&mut self);
}

/// JPEG backend over any readable, seekable source.
pub struct JpegCodec<R: Read> {
    decoder: Decoder<R>,
    layout: Option<OutputLayout>,
    frame: Option<Vec<u8>>,
    cursor: u32,
    comment: Option<Vec<u8>>,
    thumb_marker: Option<Vec<u8>>,
}

impl<R: Read + Seek> JpegCodec<R> {
    pub fn new(mut reader: R) -> ThumbResult<JpegCodec<R>> {
        let (comment, thumb_marker) = scan_markers(&mut reader)?;
        reader.seek(SeekFrom::Start(0))?;

        Ok(JpegCodec {
            decoder: Decoder::new(reader),
            layout: None,
            frame: None,
            cursor: 0,
            comment,
            thumb_marker,
        })
    }
}

impl<R: Read> ScanlineCodec for JpegCodec<R> {
    fn read_header(&mut self) -> ThumbResult<CodecHeader> {
        self.decoder.read_info()?;

        let info = match self.decoder.info() {
            Some(info) => info,
            None => return Err(ThumbError::OpenFailed(String::from("No image info after header read"))),
        };

        let color = match info.pixel_format {
            PixelFormat::L8 => SourceColor::Grayscale,
            PixelFormat::L16 => {
                return Err(ThumbError::Unsupported(String::from("16-bit grayscale JPEG")));
            }
            PixelFormat::CMYK32 => SourceColor::Cmyk,
            PixelFormat::RGB24 => SourceColor::Color,
        };

        log_debug!(
            "JPEG header: {}x{} {:?}, coding process {:?}",
            info.width,
            info.height,
            info.pixel_format,
            info.coding_process
        );

        Ok(CodecHeader {
            width: u32::from(info.width),
            height: u32::from(info.height),
            color,
            comment: self.comment.take(),
            thumb_marker: self.thumb_marker.take(),
        })
    }

    fn configure(&mut self, config: &DecodeConfig) -> ThumbResult<OutputLayout> {
        let info = match self.decoder.info() {
            Some(info) => info,
            None => return Err(ThumbError::OpenFailed(String::from("Configure before header read"))),
        };

        let denom = u32::from(config.scale_denom.max(1));
        let target_w = (((u32::from(info.width) + denom - 1) / denom).max(1)) as u16;
        let target_h = (((u32::from(info.height) + denom - 1) / denom).max(1)) as u16;

        // The decoder picks the nearest reduction it supports and reports
        // the dimensions it will actually produce.
        let (mut actual_w, mut actual_h) = self.decoder.scale(target_w, target_h)?;

        // scale() settles for the smallest reduction that reaches the
        // request on one axis, a degenerate aspect can leave the other
        // axis short. Raising the satisfied axis forces the next
        // reduction, three raises reach full size at the latest.
        let (mut req_w, mut req_h) = (target_w, target_h);
        let mut raises = 0;
        while (actual_w < target_w || actual_h < target_h) && raises < 3 {
            if actual_w >= target_w {
                req_w = req_w.max(actual_w.saturating_add(1));
            }
            if actual_h >= target_h {
                req_h = req_h.max(actual_h.saturating_add(1));
            }

            log_debug!(
                "Reduction covers {}x{} of {}x{}, raising the request to {}x{}",
                actual_w,
                actual_h,
                target_w,
                target_h,
                req_w,
                req_h
            );

            let raised = self.decoder.scale(req_w, req_h)?;
            actual_w = raised.0;
            actual_h = raised.1;
            raises += 1;
        }

        let components = match info.pixel_format {
            PixelFormat::L8 | PixelFormat::L16 => 1,
            PixelFormat::RGB24 => 3,
            PixelFormat::CMYK32 => 4,
        };

        let layout = OutputLayout {
            width: u32::from(actual_w),
            height: u32::from(actual_h),
            components,
        };

        log_debug!(
            "Configured decode at 1/{}: {}x{} -> {}x{} ({} components)",
            config.scale_denom,
            info.width,
            info.height,
            layout.width,
            layout.height,
            layout.components
        );

        self.layout = Some(layout);
        self.cursor = 0;

        Ok(layout)
    }

    fn start(&mut self) -> ThumbResult<()> {
        let layout = match self.layout {
            Some(layout) => layout,
            None => return Err(ThumbError::OpenFailed(String::from("Start before configure"))),
        };

        let frame = self.decoder.decode()?;
        let expected = layout.stride() * layout.height as usize;

        if frame.len() < expected {
            return Err(ThumbError::CodecError(format!(
                "Decoder produced {} bytes, expected {}",
                frame.len(),
                expected
            )));
        }

        self.frame = Some(frame);
        self.cursor = 0;

        Ok(())
    }

    fn output_scanline(&self) -> u32 {
        self.cursor
    }

    fn read_scanlines(&mut self, into: &mut [u8]) -> ThumbResult<u32> {
        let layout = match self.layout {
            Some(layout) => layout,
            None => return Err(ThumbError::OpenFailed(String::from("Read before configure"))),
        };

        let frame = match &self.frame {
            Some(frame) => frame,
            None => return Err(ThumbError::OpenFailed(String::from("Read before start"))),
        };

        if self.cursor >= layout.height {
            return Ok(0);
        }

        let stride = layout.stride();
        let rows_left = layout.height - self.cursor;
        let rows = SCANLINE_CHUNK.min(rows_left).min((into.len() / stride) as u32);

        if rows == 0 {
            return Err(ThumbError::CodecError(String::from("Scanline buffer smaller than one row")));
        }

        let offset = self.cursor as usize * stride;
        let length = rows as usize * stride;

        into[..length].copy_from_slice(&frame[offset..offset + length]);
        self.cursor += rows;

        Ok(rows)
    }

    fn finish(&mut self) -> ThumbResult<()> {
        // Scan state is owned by the one-shot decode, only the frame remains.
        self.frame = None;

        Ok(())
    }

    fn abort(&mut self) {
        self.frame = None;
        self.layout = None;
    }
}

// Pre-scan for COM and APP7 payloads. Best effort once the SOI marker checks
// out: a malformed segment ends the scan with whatever was captured so far.
fn scan_markers<R: Read + Seek>(reader: &mut R) -> ThumbResult<(Option<Vec<u8>>, Option<Vec<u8>>)> {
    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic)?;

    if magic != [0xFF, 0xD8] {
        return Err(ThumbError::OpenFailed(String::from("Missing SOI marker")));
    }

    let mut comment: Option<Vec<u8>> = None;
    let mut thumb_marker: Option<Vec<u8>> = None;

    loop {
        let marker = match next_marker(reader) {
            Ok(Some(marker)) => marker,
            _ => break,
        };

        match marker {
            // Standalone markers carry no length field.
            0xD8 | 0x01 | 0xD0..=0xD7 => continue,
            // Entropy data or end of image, nothing of interest follows.
            0xD9 | 0xDA => break,
            _ => {}
        }

        let length = match read_u16_be(reader) {
            Ok(length) if length >= 2 => (length - 2) as usize,
            _ => break,
        };

        match marker {
            0xFE if comment.is_none() && length <= MAX_COMMENT_BYTES => {
                match read_payload(reader, length) {
                    Ok(payload) => comment = Some(payload),
                    Err(_) => break,
                }
            }
            0xE7 if thumb_marker.is_none() && length <= MAX_THUMB_MARKER_BYTES => {
                match read_payload(reader, length) {
                    Ok(payload) => thumb_marker = Some(payload),
                    Err(_) => break,
                }
            }
            _ => {
                if reader.seek(SeekFrom::Current(length as i64)).is_err() {
                    break;
                }
            }
        }
    }

    Ok((comment, thumb_marker))
}

// Next marker byte, skipping fill bytes and stuffed zeros.
fn next_marker<R: Read>(reader: &mut R) -> std::io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    let mut pending = false;

    loop {
        if reader.read(&mut byte)? == 0 {
            return Ok(None);
        }

        if pending && byte[0] != 0xFF && byte[0] != 0x00 {
            return Ok(Some(byte[0]));
        }

        pending = byte[0] == 0xFF;
    }
}

fn read_u16_be<R: Read>(reader: &mut R) -> std::io::Result<u16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;

    Ok(u16::from_be_bytes(bytes))
}

fn read_payload<R: Read>(reader: &mut R, length: usize) -> std::io::Result<Vec<u8>> {
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;

    Ok(payload)
}
