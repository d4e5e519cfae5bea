//! Post-processing filters for scanned documents.
//!
//! Every filter is a pure `Image -> Image` transform: the input buffer is
//! never mutated and the output comes back in the input's channel layout.
//! [`apply_filter`] is the single entry point; the algorithms behind
//! `Binarize` and `Enhance` live in their own modules so a different
//! smoothing or equalization backend can be swapped without touching call
//! sites.

mod adaptive;
mod bilateral;
mod clahe;

use serde::{Deserialize, Serialize};

use scandoc_core::Image;

pub use adaptive::{adaptive_threshold, BinarizeParams};
pub use bilateral::{bilateral_filter, BilateralParams};
pub use clahe::{clahe, ClaheParams};

/// The closed set of post-processing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// Equivalent copy of the input.
    Identity,
    /// Luma conversion, re-expanded to the input layout.
    Grayscale,
    /// Local adaptive thresholding to pure black and white.
    Binarize,
    /// Edge-preserving smoothing plus local contrast equalization.
    Enhance,
}

/// Tuning for the `Enhance` filter.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct EnhanceParams {
    #[serde(default)]
    pub bilateral: BilateralParams,
    #[serde(default)]
    pub clahe: ClaheParams,
}

/// Apply `kind` with default tuning.
pub fn apply_filter(image: &Image, kind: FilterKind) -> Image {
    match kind {
        FilterKind::Identity => image.clone(),
        FilterKind::Grayscale => image.expand_gray(image.to_gray()),
        FilterKind::Binarize => binarize(image, &BinarizeParams::default()),
        FilterKind::Enhance => enhance(image, &EnhanceParams::default()),
    }
}

/// Grayscale conversion + local adaptive threshold.
pub fn binarize(image: &Image, params: &BinarizeParams) -> Image {
    let gray = image.to_gray();
    let bw = adaptive_threshold(&gray.as_view(), params);
    image.expand_gray(bw)
}

/// Bilateral smoothing followed by CLAHE, back in the input layout.
pub fn enhance(image: &Image, params: &EnhanceParams) -> Image {
    let gray = image.to_gray();
    let smoothed = bilateral_filter(&gray.as_view(), &params.bilateral);
    let equalized = clahe(&smoothed.as_view(), &params.clahe);
    log::debug!(
        "enhance: {}x{} smoothed and equalized",
        gray.width,
        gray.height
    );
    image.expand_gray(equalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scandoc_core::{GrayImage, RgbImage};

    fn sample_rgb() -> Image {
        let mut data = Vec::new();
        for i in 0..(12 * 10) {
            data.extend_from_slice(&[(i % 256) as u8, ((i * 3) % 256) as u8, 200]);
        }
        Image::Rgb(RgbImage::from_vec(12, 10, data).unwrap())
    }

    #[test]
    fn identity_is_pixel_for_pixel_equal() {
        let img = sample_rgb();
        assert_eq!(apply_filter(&img, FilterKind::Identity), img);
    }

    #[test]
    fn filters_keep_the_input_layout() {
        let img = sample_rgb();
        for kind in [
            FilterKind::Identity,
            FilterKind::Grayscale,
            FilterKind::Binarize,
            FilterKind::Enhance,
        ] {
            let out = apply_filter(&img, kind);
            assert_eq!(out.channels(), 3, "{kind:?}");
            assert_eq!((out.width(), out.height()), (12, 10), "{kind:?}");
        }

        let gray = Image::Gray(GrayImage::new_fill(12, 10, 66));
        for kind in [FilterKind::Grayscale, FilterKind::Binarize] {
            assert_eq!(apply_filter(&gray, kind).channels(), 1, "{kind:?}");
        }
    }

    #[test]
    fn grayscale_of_gray_input_is_identity() {
        let gray = Image::Gray(GrayImage::new_fill(7, 5, 123));
        assert_eq!(apply_filter(&gray, FilterKind::Grayscale), gray);
    }

    #[test]
    fn grayscale_rgb_has_equal_channels() {
        let Image::Rgb(out) = apply_filter(&sample_rgb(), FilterKind::Grayscale) else {
            panic!("layout must be preserved");
        };
        for px in out.data.chunks_exact(3) {
            assert!(px[0] == px[1] && px[1] == px[2]);
        }
    }

    #[test]
    fn binarize_is_two_level() {
        let Image::Rgb(out) = apply_filter(&sample_rgb(), FilterKind::Binarize) else {
            panic!("layout must be preserved");
        };
        assert!(out.data.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn filter_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&FilterKind::Binarize).unwrap(),
            "\"binarize\""
        );
        let k: FilterKind = serde_json::from_str("\"enhance\"").unwrap();
        assert_eq!(k, FilterKind::Enhance);
    }
}
