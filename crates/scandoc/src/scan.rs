//! End-to-end helpers on top of the `image` crate.
//!
//! Everything here is a thin adapter: decode/encode stays with `image`,
//! the geometry and filtering stay in the sub-crates. [`scan_page`] chains
//! the whole pipeline (detect, rectify, filter) the way an interactive
//! scanner app would, including the full-frame fallback when no document
//! boundary is found.

use image::DynamicImage;
use thiserror::Error;

use crate::{
    apply_filter, rectify, BoundaryDetector, CornerSource, DetectError, DetectParams, FilterKind,
    Image, Quad, QuadError, RectifyError,
};
use scandoc_core::{GrayImage, RgbImage};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
    #[error(transparent)]
    Corners(#[from] QuadError),
}

/// Convert a decoded `image` buffer into the internal representation.
///
/// Luma inputs stay single-channel; everything else goes through RGB8
/// (alpha is dropped).
pub fn to_core_image(img: &DynamicImage) -> Image {
    match img {
        DynamicImage::ImageLuma8(g) => {
            let (w, h) = (g.width() as usize, g.height() as usize);
            Image::Gray(
                GrayImage::from_vec(w, h, g.as_raw().clone())
                    .unwrap_or_else(|_| GrayImage::new_fill(w, h, 0)),
            )
        }
        other => {
            let rgb = other.to_rgb8();
            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            Image::Rgb(
                RgbImage::from_vec(w, h, rgb.into_raw())
                    .unwrap_or_else(|_| RgbImage::new_fill(w, h, [0, 0, 0])),
            )
        }
    }
}

/// Convert back for encoding or display.
pub fn from_core_image(img: &Image) -> DynamicImage {
    match img {
        Image::Gray(g) => {
            let buf = image::GrayImage::from_raw(g.width as u32, g.height as u32, g.data.clone())
                .unwrap_or_else(|| image::GrayImage::new(0, 0));
            DynamicImage::ImageLuma8(buf)
        }
        Image::Rgb(c) => {
            let buf =
                image::RgbImage::from_raw(c.width as u32, c.height as u32, c.data.clone())
                    .unwrap_or_else(|| image::RgbImage::new(0, 0));
            DynamicImage::ImageRgb8(buf)
        }
    }
}

/// Run boundary detection on a decoded photo.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip_all, fields(width = img.width(), height = img.height()))
)]
pub fn detect_page(
    img: &DynamicImage,
    params: &DetectParams,
) -> Result<Option<Quad>, DetectError> {
    BoundaryDetector::new(params.clone()).detect(&to_core_image(img))
}

/// Warp the region under `corners` to an axis-aligned page.
pub fn rectify_page(img: &DynamicImage, corners: &Quad) -> Result<DynamicImage, RectifyError> {
    Ok(from_core_image(&rectify(&to_core_image(img), corners)?))
}

/// Result of a full [`scan_page`] run.
#[derive(Clone, Debug)]
pub struct ScannedPage {
    /// Rectified and filtered page image.
    pub page: DynamicImage,
    /// Corners used for rectification.
    pub corners: Quad,
    /// Provenance of those corners; `None` means the full-frame fallback
    /// was used because nothing was detected.
    pub source: Option<CornerSource>,
}

/// The full pipeline: detect (unless corners are supplied), rectify, filter.
///
/// When detection finds nothing the whole frame is scanned, so this never
/// fails just because the photo has no clear document boundary.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip_all, fields(width = img.width(), height = img.height(), filter = ?filter))
)]
pub fn scan_page(
    img: &DynamicImage,
    corners: Option<CornerSource>,
    filter: FilterKind,
    params: &DetectParams,
) -> Result<ScannedPage, ScanError> {
    let core_img = to_core_image(img);

    let source = match corners {
        Some(c) => Some(c),
        None => BoundaryDetector::new(params.clone())
            .detect(&core_img)?
            .map(CornerSource::Detected),
    };
    let quad = match &source {
        Some(c) => *c.quad(),
        None => {
            log::info!("no boundary found, scanning the full frame");
            Quad::full_frame(core_img.width(), core_img.height())?
        }
    };

    let flat = rectify(&core_img, &quad)?;
    let page = from_core_image(&apply_filter(&flat, filter));
    Ok(ScannedPage {
        page,
        corners: quad,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_dynamic(w: u32, h: u32, v: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(image::GrayImage::from_pixel(w, h, image::Luma([v])))
    }

    #[test]
    fn conversion_round_trips_luma_and_rgb() {
        let g = gray_dynamic(9, 7, 128);
        assert_eq!(from_core_image(&to_core_image(&g)), g);

        let mut rgb = image::RgbImage::new(5, 4);
        for (i, px) in rgb.pixels_mut().enumerate() {
            *px = image::Rgb([i as u8, (i * 2) as u8, 255 - i as u8]);
        }
        let d = DynamicImage::ImageRgb8(rgb);
        assert_eq!(from_core_image(&to_core_image(&d)), d);
    }

    #[test]
    fn rgba_input_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            3,
            image::Rgba([10, 20, 30, 40]),
        ));
        let core_img = to_core_image(&rgba);
        assert_eq!(core_img.channels(), 3);
        assert_eq!((core_img.width(), core_img.height()), (3, 3));
    }

    #[test]
    fn uniform_photo_falls_back_to_full_frame() {
        let img = gray_dynamic(64, 48, 180);
        let scanned = scan_page(&img, None, FilterKind::Identity, &DetectParams::default())
            .expect("fallback must succeed");
        assert!(scanned.source.is_none());
        assert_eq!(scanned.page.width(), 64);
        assert_eq!(scanned.page.height(), 48);
    }

    #[test]
    fn user_corners_bypass_detection() {
        let img = gray_dynamic(100, 100, 180);
        let quad = Quad::new([
            nalgebra::Point2::new(10.0, 10.0),
            nalgebra::Point2::new(60.0, 10.0),
            nalgebra::Point2::new(60.0, 90.0),
            nalgebra::Point2::new(10.0, 90.0),
        ])
        .unwrap();
        let scanned = scan_page(
            &img,
            Some(CornerSource::UserAdjusted(quad)),
            FilterKind::Identity,
            &DetectParams::default(),
        )
        .unwrap();
        assert!(matches!(scanned.source, Some(CornerSource::UserAdjusted(_))));
        assert_eq!(scanned.page.width(), 50);
        assert_eq!(scanned.page.height(), 80);
    }

    #[test]
    fn corner_source_serializes_with_tag() {
        let quad = Quad::from_rect(0.0, 0.0, 4.0, 4.0).unwrap();
        let json = serde_json::to_string(&CornerSource::Detected(quad)).unwrap();
        assert!(json.contains("\"source\":\"detected\""), "{json}");
        let back: CornerSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CornerSource::Detected(quad));
    }
}
