//! Local-neighborhood adaptive thresholding.
//!
//! Each pixel is compared against the Gaussian-weighted mean of its window
//! minus a constant offset. Document photos are unevenly lit; a single global
//! threshold blows out shadowed regions where this stays stable.

use scandoc_core::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Neighborhood window size (odd).
    pub window: usize,
    /// Constant subtracted from the local mean.
    pub offset: f32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            window: 11,
            offset: 2.0,
        }
    }
}

/// Two-level output: 255 where the pixel exceeds its local threshold, else 0.
pub fn adaptive_threshold(src: &GrayImageView<'_>, params: &BinarizeParams) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return GrayImage::new_fill(w, h, 0);
    }

    let window = params.window.max(3) | 1;
    let kernel = gaussian_window(window);
    let r = (window / 2) as i32;

    // separable weighted mean, clamped borders
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &g) in kernel.iter().enumerate() {
                let sx = (x as i32 + k as i32 - r).clamp(0, w as i32 - 1) as usize;
                acc += g * src.data[row + sx] as f32;
            }
            tmp[row + x] = acc;
        }
    }

    let mut out = GrayImage::new_fill(w, h, 0);
    for y in 0..h {
        for x in 0..w {
            let mut mean = 0.0f32;
            for (k, &g) in kernel.iter().enumerate() {
                let sy = (y as i32 + k as i32 - r).clamp(0, h as i32 - 1) as usize;
                mean += g * tmp[sy * w + x];
            }
            let idx = y * w + x;
            if src.data[idx] as f32 > mean - params.offset {
                out.data[idx] = 255;
            }
        }
    }
    out
}

fn gaussian_window(window: usize) -> Vec<f32> {
    let sigma = 0.3 * ((window as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let c = (window / 2) as f32;
    let mut k: Vec<f32> = (0..window)
        .map(|i| {
            let d = i as f32 - c;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}
