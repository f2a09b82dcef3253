use std::fmt::{Debug, Formatter};

use crate::ColorSpace;

/// Snapshot of a thumbnail handle for display.
pub struct ThumbInfo {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub out_w: u32,
    pub out_h: u32,
    pub scale_denominator: u8,
    pub decoded: bool,
    pub scaled: bool,
    pub comment: Option<String>,
    pub thumb_marker_len: Option<usize>,
}

impl Debug for ThumbInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dimensions: {}x{}", self.width, self.height)?;
        writeln!(f, "Color space: {:?}", self.color_space)?;
        writeln!(f, "Output rectangle: {}x{}", self.out_w, self.out_h)?;
        writeln!(f, "Scale denominator: {}", self.scale_denominator)?;
        writeln!(f, "Decoded: {}, scaled: {}", self.decoded, self.scaled)?;

        match &self.comment {
            Some(comment) => {
                writeln!(f, "Comment: {}", comment)?;
            }
            None => {
                writeln!(f, "Comment: None")?;
            }
        }

        match self.thumb_marker_len {
            Some(length) => {
                writeln!(f, "Thumbnail marker: {} bytes", length)?;
            }
            None => {
                writeln!(f, "Thumbnail marker: None")?;
            }
        }

        Ok(())
    }
}
