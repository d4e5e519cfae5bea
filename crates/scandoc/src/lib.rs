//! High-level facade crate for the `scandoc-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the detection, rectification and filter crates
//! - (feature-gated) end-to-end helpers working directly on `image` crate
//!   buffers, including the detect -> adjust -> rectify -> filter pipeline
//!
//! ## Quickstart
//!
//! ```no_run
//! use scandoc::scan;
//! use scandoc::FilterKind;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = ImageReader::open("page.jpg")?.decode()?;
//! let scanned = scan::scan_page(&photo, None, FilterKind::Enhance, &Default::default())?;
//! scanned.page.save("page-flat.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `scandoc::core`: image containers, `Quad`, homography, `rectify`/`rotate`.
//! - `scandoc::detect`: the boundary detector and its tuning.
//! - `scandoc::filter`: `FilterKind` and the page filters.
//! - `scandoc::scan` (feature `image`): end-to-end helpers from
//!   `image::DynamicImage`.

pub use scandoc_core as core;
pub use scandoc_detect as detect;
pub use scandoc_filter as filter;

pub use scandoc_core::{rectify, rotate, Image, Quad, QuadError, RectifyError};
pub use scandoc_detect::{BoundaryDetector, DetectError, DetectParams};
pub use scandoc_filter::{apply_filter, FilterKind};

use serde::{Deserialize, Serialize};

/// A quadrilateral tagged with where it came from.
///
/// The rectifier treats both variants identically; the tag preserves
/// provenance (auto-detected vs. dragged by the user) for logging and
/// debugging without coupling the core to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "corners", rename_all = "kebab-case")]
pub enum CornerSource {
    Detected(Quad),
    UserAdjusted(Quad),
}

impl CornerSource {
    pub fn quad(&self) -> &Quad {
        match self {
            CornerSource::Detected(q) | CornerSource::UserAdjusted(q) => q,
        }
    }
}

#[cfg(feature = "image")]
pub mod scan;
