//! Edge-preserving bilateral smoothing.
//!
//! Direct windowed filter: each neighbor is weighted by spatial distance and
//! by intensity difference, so paper grain averages out while text strokes
//! keep their contrast. The range weights come from a 256-entry lookup table
//! and the spatial mask is precomputed once per call.

use scandoc_core::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BilateralParams {
    /// Window diameter in pixels.
    pub diameter: usize,
    /// Intensity-difference sigma.
    pub sigma_color: f32,
    /// Spatial-distance sigma.
    pub sigma_space: f32,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
        }
    }
}

pub fn bilateral_filter(src: &GrayImageView<'_>, params: &BilateralParams) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return GrayImage::new_fill(w, h, 0);
    }

    let d = params.diameter.max(1) | 1;
    let r = (d / 2) as i32;

    let inv_2ss = 1.0 / (2.0 * params.sigma_space * params.sigma_space);
    let mut spatial = vec![0.0f32; d * d];
    for dy in -r..=r {
        for dx in -r..=r {
            let i = ((dy + r) as usize) * d + (dx + r) as usize;
            spatial[i] = (-((dx * dx + dy * dy) as f32) * inv_2ss).exp();
        }
    }

    let inv_2sc = 1.0 / (2.0 * params.sigma_color * params.sigma_color);
    let mut range = [0.0f32; 256];
    for (diff, v) in range.iter_mut().enumerate() {
        *v = (-(diff as f32 * diff as f32) * inv_2sc).exp();
    }

    let mut out = GrayImage::new_fill(w, h, 0);
    for y in 0..h {
        for x in 0..w {
            let center = src.data[y * w + x];
            let mut acc = 0.0f32;
            let mut norm = 0.0f32;
            for dy in -r..=r {
                let sy = (y as i32 + dy).clamp(0, h as i32 - 1) as usize;
                for dx in -r..=r {
                    let sx = (x as i32 + dx).clamp(0, w as i32 - 1) as usize;
                    let v = src.data[sy * w + sx];
                    let diff = (v as i32 - center as i32).unsigned_abs() as usize;
                    let wgt = spatial[((dy + r) as usize) * d + (dx + r) as usize] * range[diff];
                    acc += wgt * v as f32;
                    norm += wgt;
                }
            }
            out.data[y * w + x] = (acc / norm).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_is_unchanged() {
        let img = GrayImage::new_fill(16, 16, 90);
        let out = bilateral_filter(&img.as_view(), &BilateralParams::default());
        assert_eq!(out.data, img.data);
    }

    #[test]
    fn smooths_noise_but_keeps_step_edges() {
        let w = 40;
        let h = 20;
        let mut data = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                // step 40 | 220 plus deterministic +-6 ripple
                let base = if x < 20 { 40i32 } else { 220 };
                let ripple = ((x * 7 + y * 11) % 13) as i32 - 6;
                data[y * w + x] = (base + ripple).clamp(0, 255) as u8;
            }
        }
        let img = GrayImage::from_vec(w, h, data).unwrap();
        let out = bilateral_filter(&img.as_view(), &BilateralParams::default());

        // ripple flattened away from the step
        for y in 5..15 {
            for x in 5..12 {
                let v = out.data[y * w + x] as i32;
                assert!((v - 40).abs() <= 4, "residual ripple {v} at ({x},{y})");
            }
        }
        // the step itself survives
        let left = out.data[10 * w + 17] as i32;
        let right = out.data[10 * w + 22] as i32;
        assert!(right - left > 120, "edge washed out: {left} vs {right}");
    }
}
