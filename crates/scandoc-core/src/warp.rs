//! Perspective rectification and affine rotation.
//!
//! Both operations resample through the inverse mapping: every output pixel
//! is traced back into the source and sampled bilinearly, so the output is
//! fully defined and never half-written. Coordinates follow the source
//! convention that pixel `(x, y)` sits at coordinate `(x, y)`; the
//! rectifier's 4 correspondences therefore bound exactly the output
//! rectangle and an identity quad reproduces the input.

use nalgebra::Point2;
use thiserror::Error;

use crate::image::{sample_bilinear_rgb, sample_bilinear_u8, GrayImage, Image, RgbImage};
use crate::quad::{Quad, QuadError};
use crate::Homography;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("empty input image ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
    #[error(transparent)]
    DegenerateGeometry(#[from] QuadError),
    #[error("corners collapse to an empty target rectangle ({width:.2}x{height:.2} px)")]
    CollapsedTarget { width: f32, height: f32 },
    #[error("corners admit no unique perspective transform")]
    NoPerspective,
}

/// Project `corners` onto an upright rectangle and resample the image.
///
/// The target width is the longer of the two horizontal edges (0-1, 2-3) and
/// the target height the longer of the two vertical edges (0-3, 1-2), so the
/// output always expands toward the less foreshortened estimate instead of
/// cropping content.
pub fn rectify(image: &Image, corners: &Quad) -> Result<Image, RectifyError> {
    if image.is_empty() {
        return Err(RectifyError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let target_w = corners.edge_len(0).max(corners.edge_len(2));
    let target_h = corners.edge_len(3).max(corners.edge_len(1));
    let out_w = target_w.round() as usize;
    let out_h = target_h.round() as usize;
    if out_w == 0 || out_h == 0 {
        return Err(RectifyError::CollapsedTarget {
            width: target_w,
            height: target_h,
        });
    }

    let w = out_w as f32;
    let h = out_h as f32;
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ];
    let h_img_from_rect = Homography::from_correspondences(&rect, corners.corners())
        .ok_or(RectifyError::NoPerspective)?;

    log::debug!(
        "rectify: {}x{} -> {}x{}",
        image.width(),
        image.height(),
        out_w,
        out_h
    );

    Ok(warp(image, out_w, out_h, |x, y| {
        let p = h_img_from_rect.apply(Point2::new(x, y));
        (p.x, p.y)
    }))
}

/// Rotate about the image center onto a same-size canvas.
///
/// Positive angles rotate clockwise in y-down image coordinates. Corners that
/// leave the canvas are clipped; uncovered pixels read black. This matches
/// the caller-facing contract that a non-multiple-of-90 rotation clips or
/// pads rather than resizing.
pub fn rotate(image: &Image, degrees_clockwise: f32) -> Image {
    let out_w = image.width();
    let out_h = image.height();
    let cx = (out_w as f32 - 1.0) * 0.5;
    let cy = (out_h as f32 - 1.0) * 0.5;
    let (sin, cos) = degrees_clockwise.to_radians().sin_cos();

    warp(image, out_w, out_h, move |x, y| {
        let dx = x - cx;
        let dy = y - cy;
        (cos * dx + sin * dy + cx, -sin * dx + cos * dy + cy)
    })
}

/// Resample `src` into a fresh `out_w` x `out_h` canvas in the same channel
/// layout, pulling each output pixel from `map(x, y)` in source coordinates.
fn warp(src: &Image, out_w: usize, out_h: usize, map: impl Fn(f32, f32) -> (f32, f32)) -> Image {
    match src {
        Image::Gray(g) => {
            let view = g.as_view();
            let mut data = Vec::with_capacity(out_w * out_h);
            for y in 0..out_h {
                for x in 0..out_w {
                    let (sx, sy) = map(x as f32, y as f32);
                    data.push(sample_bilinear_u8(&view, sx, sy));
                }
            }
            Image::Gray(GrayImage {
                width: out_w,
                height: out_h,
                data,
            })
        }
        Image::Rgb(c) => {
            let view = c.as_view();
            let mut data = Vec::with_capacity(out_w * out_h * 3);
            for y in 0..out_h {
                for x in 0..out_w {
                    let (sx, sy) = map(x as f32, y as f32);
                    data.extend_from_slice(&sample_bilinear_rgb(&view, sx, sy));
                }
            }
            Image::Rgb(RgbImage {
                width: out_w,
                height: out_h,
                data,
            })
        }
    }
}
