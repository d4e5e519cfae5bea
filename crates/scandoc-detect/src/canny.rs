//! Edge map extraction: Gaussian pre-smooth, Sobel gradients, non-maximum
//! suppression and two-threshold hysteresis.
//!
//! Thresholds are applied to the L1 gradient magnitude `|gx| + |gy|` of the
//! 3x3 Sobel operator, so the 75/200 defaults live on the same scale the
//! original tuning used. Borders are clamped.

use scandoc_core::{GrayImage, GrayImageView};

/// Separable Gaussian blur with an odd `ksize`-tap kernel.
///
/// Sigma is derived from the kernel size (`0.3 * ((ksize - 1) * 0.5 - 1) +
/// 0.8`), the usual choice when only the kernel size is specified. Too small
/// a kernel leaves fragmented edges, too large erases the page boundary.
pub fn gaussian_blur(src: &GrayImageView<'_>, ksize: usize) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 || ksize < 2 {
        return GrayImage {
            width: w,
            height: h,
            data: src.data.to_vec(),
        };
    }

    let ksize = if ksize % 2 == 0 { ksize + 1 } else { ksize };
    let kernel = gaussian_kernel(ksize);
    let r = (ksize / 2) as i32;

    // horizontal pass into f32, then vertical pass back to u8
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

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &g) in kernel.iter().enumerate() {
                let sy = (y as i32 + k as i32 - r).clamp(0, h as i32 - 1) as usize;
                acc += g * tmp[sy * w + x];
            }
            out[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

pub(crate) fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let c = (ksize / 2) as f32;
    let mut k: Vec<f32> = (0..ksize)
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

/// Binary edge map (0 or 255) from two-threshold gradient detection.
pub fn detect_edges(src: &GrayImageView<'_>, low: f32, high: f32) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let mut out = GrayImage::new_fill(w, h, 0);
    if w < 3 || h < 3 {
        return out;
    }

    let (low, high) = if high < low { (high, low) } else { (low, high) };

    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];
    let mut mag = vec![0.0f32; w * h];

    for y in 0..h {
        let ym1 = y.saturating_sub(1);
        let yp1 = (y + 1).min(h - 1);
        for x in 0..w {
            let xm1 = x.saturating_sub(1);
            let xp1 = (x + 1).min(w - 1);

            let p00 = src.data[ym1 * w + xm1] as f32;
            let p01 = src.data[ym1 * w + x] as f32;
            let p02 = src.data[ym1 * w + xp1] as f32;
            let p10 = src.data[y * w + xm1] as f32;
            let p12 = src.data[y * w + xp1] as f32;
            let p20 = src.data[yp1 * w + xm1] as f32;
            let p21 = src.data[yp1 * w + x] as f32;
            let p22 = src.data[yp1 * w + xp1] as f32;

            let gxx = (p02 + 2.0 * p12 + p22) - (p00 + 2.0 * p10 + p20);
            let gyy = (p20 + 2.0 * p21 + p22) - (p00 + 2.0 * p01 + p02);

            let idx = y * w + x;
            gx[idx] = gxx;
            gy[idx] = gyy;
            mag[idx] = gxx.abs() + gyy.abs();
        }
    }

    // non-maximum suppression along the quantized gradient direction
    let mut nms = vec![0.0f32; w * h];
    const TAN22_5: f32 = 0.414_213_57;
    const TAN67_5: f32 = 2.414_213_7;
    for y in 1..(h - 1) {
        for x in 1..(w - 1) {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= 0.0 {
                continue;
            }
            let ax = gx[idx].abs();
            let ay = gy[idx].abs();
            let (i1, i2) = if ay <= ax * TAN22_5 {
                (idx - 1, idx + 1)
            } else if ay >= ax * TAN67_5 {
                (idx - w, idx + w)
            } else if gx[idx] * gy[idx] > 0.0 {
                (idx - w - 1, idx + w + 1)
            } else {
                (idx - w + 1, idx + w - 1)
            };
            if m >= mag[i1] && m >= mag[i2] {
                nms[idx] = m;
            }
        }
    }

    // hysteresis: seed from strong pixels, grow through weak ones
    let n = w * h;
    let mut visited = vec![0u8; n];
    let mut stack = Vec::new();
    for (idx, &v) in nms.iter().enumerate() {
        if v >= high && visited[idx] == 0 {
            visited[idx] = 1;
            stack.push(idx);
        }
    }
    while let Some(idx) = stack.pop() {
        out.data[idx] = 255;
        let x = idx % w;
        let y = idx / w;
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(w - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let nidx = ny * w + nx;
                if visited[nidx] == 0 && nms[nidx] >= low {
                    visited[nidx] = 1;
                    stack.push(nidx);
                }
            }
        }
    }

    out
}
