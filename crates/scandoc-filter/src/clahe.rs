//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a tile grid; each tile gets a clipped, equalized
//! intensity mapping and every pixel blends the mappings of its 4 nearest
//! tile centers. Clipping caps how much a near-empty histogram bin can be
//! amplified, which keeps flat paper regions from turning into noise.

use scandoc_core::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ClaheParams {
    /// Histogram clip limit relative to the uniform bin height.
    pub clip_limit: f32,
    /// Tile grid size (tiles x tiles).
    pub tiles: usize,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles: 8,
        }
    }
}

pub fn clahe(src: &GrayImageView<'_>, params: &ClaheParams) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return GrayImage::new_fill(w, h, 0);
    }

    // never more tiles than pixels along an axis
    let tx = params.tiles.clamp(1, w);
    let ty = params.tiles.clamp(1, h);

    let luts = build_tile_luts(src, tx, ty, params.clip_limit);

    let tile_w = w as f32 / tx as f32;
    let tile_h = h as f32 / ty as f32;

    let mut out = GrayImage::new_fill(w, h, 0);
    for y in 0..h {
        let fy = (y as f32 + 0.5) / tile_h - 0.5;
        let j0 = fy.floor().clamp(0.0, (ty - 1) as f32) as usize;
        let j1 = (j0 + 1).min(ty - 1);
        let wy = (fy - j0 as f32).clamp(0.0, 1.0);
        for x in 0..w {
            let fx = (x as f32 + 0.5) / tile_w - 0.5;
            let i0 = fx.floor().clamp(0.0, (tx - 1) as f32) as usize;
            let i1 = (i0 + 1).min(tx - 1);
            let wx = (fx - i0 as f32).clamp(0.0, 1.0);

            let v = src.data[y * w + x] as usize;
            let m00 = luts[j0 * tx + i0][v] as f32;
            let m10 = luts[j0 * tx + i1][v] as f32;
            let m01 = luts[j1 * tx + i0][v] as f32;
            let m11 = luts[j1 * tx + i1][v] as f32;

            let top = m00 + wx * (m10 - m00);
            let bottom = m01 + wx * (m11 - m01);
            let m = top + wy * (bottom - top);
            out.data[y * w + x] = m.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn build_tile_luts(src: &GrayImageView<'_>, tx: usize, ty: usize, clip_limit: f32) -> Vec<[u8; 256]> {
    let w = src.width;
    let h = src.height;
    let mut luts = Vec::with_capacity(tx * ty);

    for j in 0..ty {
        let y0 = j * h / ty;
        let y1 = ((j + 1) * h / ty).max(y0 + 1);
        for i in 0..tx {
            let x0 = i * w / tx;
            let x1 = ((i + 1) * w / tx).max(x0 + 1);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[src.data[y * w + x] as usize] += 1;
                }
            }
            let area = ((y1 - y0) * (x1 - x0)) as u32;

            // clip and redistribute the excess uniformly
            let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);
            let mut excess = 0u32;
            for b in hist.iter_mut() {
                if *b > clip {
                    excess += *b - clip;
                    *b = clip;
                }
            }
            let bump = excess / 256;
            let mut leftover = excess % 256;
            for b in hist.iter_mut() {
                *b += bump;
                if leftover > 0 {
                    *b += 1;
                    leftover -= 1;
                }
            }

            let scale = 255.0 / area as f32;
            let mut lut = [0u8; 256];
            let mut cum = 0u32;
            for (v, b) in hist.iter().enumerate() {
                cum += *b;
                lut[v] = (cum as f32 * scale).round().clamp(0.0, 255.0) as u8;
            }
            luts.push(lut);
        }
    }
    luts
}
