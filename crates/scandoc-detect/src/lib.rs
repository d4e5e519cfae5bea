//! Document boundary detection for `scandoc`.
//!
//! Given a raster image, [`BoundaryDetector::detect`] proposes the 4-corner
//! outline of the photographed page, or `None` when nothing page-shaped is
//! visible. The intermediate stages (edge map, contours) are exposed for
//! tuning and debugging but callers normally go straight to the detector.

mod canny;
mod contour;
mod detector;

pub use canny::{detect_edges, gaussian_blur};
pub use contour::{approx_polygon, trace_contours, Contour};
pub use detector::{BoundaryDetector, DetectError, DetectParams};
