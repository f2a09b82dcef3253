/// Largest decode-time reduction a codec is asked for.
pub const MAX_SCALE_DENOMINATOR: u8 = 8;

/// Decode-time scale plan: the reduction requested from the codec and the
/// exact output rectangle the resampler has to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    pub denominator: u8,
    pub out_w: u32,
    pub out_h: u32,
}

impl ScalePlan {
    /// Plans a downscale of an `in_w x in_h` source bounded by
    /// `req_w x req_h`.
    ///
    /// The request is an outer bound, not an exact size. Requested dimensions
    /// are clamped to `1..=source`, the engine never upscales. The output
    /// rectangle keeps the source aspect ratio: the tighter axis lands
    /// exactly on its request and the other is derived (rounded half up,
    /// floored at one pixel). The denominator is the integer reduction
    /// `min(in_w / req_w, in_h / req_h)` clamped to `[1, 8]`, advisory for
    /// decode efficiency only.
    pub fn new(in_w: u32, in_h: u32, req_w: u32, req_h: u32) -> ScalePlan {
        debug_assert!(in_w >= 1 && in_h >= 1);

        let req_w = req_w.clamp(1, in_w);
        let req_h = req_h.clamp(1, in_h);

        let scale_w = in_w / req_w;
        let scale_h = in_h / req_h;
        let denominator = scale_w.min(scale_h).clamp(1, MAX_SCALE_DENOMINATOR as u32) as u8;

        // in_w / req_w >= in_h / req_h, cross-multiplied.
        let width_tight = in_w as u64 * req_h as u64 >= in_h as u64 * req_w as u64;

        let (out_w, out_h) = if width_tight {
            (req_w, Self::derive(in_h, req_w, in_w))
        } else {
            (Self::derive(in_w, req_h, in_h), req_h)
        };

        ScalePlan {
            denominator,
            out_w,
            out_h,
        }
    }

    // round(a * b / c) half up, floored at one pixel.
    fn derive(a: u32, b: u32, c: u32) -> u32 {
        let numerator = a as u64 * b as u64;

        (((2 * numerator + c as u64) / (2 * c as u64)) as u32).max(1)
    }
}
