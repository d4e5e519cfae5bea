//! Document boundary detection.
//!
//! Pipeline: intensity conversion, Gaussian smoothing, two-threshold edge
//! detection, closed-contour tracing, polygon simplification, then selection
//! of the largest 4-vertex candidate. Finding no document is the expected
//! outcome for many frames and is reported as `Ok(None)`, never as an error;
//! the detector also never invents corners when nothing page-shaped exists.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scandoc_core::{order_corners, Image, Quad};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::canny::{detect_edges, gaussian_blur};
use crate::contour::{approx_polygon, trace_contours};

/// Detection tuning.
///
/// Defaults reproduce the reference tuning: 5-tap blur, hysteresis at 75/200
/// on the Sobel L1 magnitude, simplification tolerance of 2% of each
/// contour's perimeter. Exact area ties between candidates keep the first
/// one in contour-scan order (implementation-defined).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectParams {
    /// Gaussian pre-smooth kernel size (odd).
    pub blur_kernel: usize,
    /// Hysteresis low threshold on the gradient magnitude.
    pub low_threshold: f32,
    /// Hysteresis high threshold on the gradient magnitude.
    pub high_threshold: f32,
    /// Douglas-Peucker tolerance as a fraction of contour perimeter.
    pub approx_tolerance: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            low_threshold: 75.0,
            high_threshold: 200.0,
            approx_tolerance: 0.02,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("empty image ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
}

/// Stateless boundary detector; one instance can serve any number of
/// concurrent calls.
#[derive(Clone, Debug, Default)]
pub struct BoundaryDetector {
    params: DetectParams,
}

impl BoundaryDetector {
    pub fn new(params: DetectParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Find the most plausible document quadrilateral.
    ///
    /// Returns `Ok(None)` when no contour simplifies to 4 vertices; callers
    /// should fall back to a default placement such as
    /// [`Quad::full_frame`]. Corners come back ordered TL, TR, BR, BL.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width(), height = image.height()))
    )]
    pub fn detect(&self, image: &Image) -> Result<Option<Quad>, DetectError> {
        if image.is_empty() {
            return Err(DetectError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let gray = image.to_gray();
        let blurred = gaussian_blur(&gray.as_view(), self.params.blur_kernel);
        let edges = detect_edges(
            &blurred.as_view(),
            self.params.low_threshold,
            self.params.high_threshold,
        );
        let contours = trace_contours(&edges.as_view());
        log::debug!("detect: {} contour(s) traced", contours.len());

        let mut best: Option<(f32, Quad)> = None;
        for contour in &contours {
            let area = contour.area();
            if area <= best.as_ref().map_or(0.0, |(a, _)| *a) {
                continue;
            }
            let eps = self.params.approx_tolerance * contour.perimeter();
            let poly = approx_polygon(&contour.points, eps);
            if poly.len() != 4 {
                continue;
            }
            let ordered = order_corners([poly[0], poly[1], poly[2], poly[3]]);
            // A 4-vertex simplification that fails validation (collinear,
            // crossed) is not a plausible page; skip it rather than guess.
            if let Ok(quad) = Quad::new(ordered) {
                best = Some((area, quad));
            }
        }

        match &best {
            Some((area, quad)) => log::debug!(
                "detect: best candidate area {:.0} px^2, corners {:?}",
                area,
                quad.corners()
            ),
            None => log::debug!("detect: no 4-vertex candidate"),
        }
        Ok(best.map(|(_, q)| q))
    }
}
