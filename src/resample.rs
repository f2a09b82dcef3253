use crate::log_warn;

/// Shrinks a decoded raster to `out_w x out_h` in place with nearest
/// neighbor sampling.
///
/// Rows keep the decode stride, so after the pass the first `out_h` rows
/// hold `out_w` valid pixels each and the rest of the buffer is stale.
/// Output dimensions never exceed the decoded ones, which keeps every
/// source offset at or ahead of its destination and makes the in-place
/// copy safe.
pub fn resample_nearest(
    data: &mut [u8],
    dec_w: u32,
    dec_h: u32,
    components: usize,
    out_w: u32,
    out_h: u32,
) {
    if out_w == dec_w && out_h == dec_h {
        return;
    }

    if dec_w < 1 || dec_h < 1 || out_w < 1 || out_h < 1 {
        return;
    }

    // Upscaling is not supported, only shrink in place.
    if out_w > dec_w || out_h > dec_h {
        return;
    }

    let stride = dec_w as usize * components;

    if data.len() < stride * dec_h as usize {
        log_warn!(
            "Raster smaller than its declared size: {} < {}",
            data.len(),
            stride * dec_h as usize
        );
        return;
    }

    for y in 0..out_h as usize {
        let src_y = y * dec_h as usize / out_h as usize;
        let row_src = src_y * stride;
        let row_dst = y * stride;

        debug_assert!(row_src >= row_dst);

        for x in 0..out_w as usize {
            let src = row_src + x * dec_w as usize / out_w as usize * components;
            let dst = row_dst + x * components;

            debug_assert!(src >= dst);

            if src == dst {
                continue;
            }

            data.copy_within(src..src + components, dst);
        }
    }
}
