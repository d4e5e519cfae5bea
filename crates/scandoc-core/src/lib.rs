//! Core types and geometry for document scanning.
//!
//! This crate holds the pieces every other `scandoc-*` crate builds on:
//! pixel containers in the two supported channel layouts, the validated
//! [`Quad`] corner type, the 4-point homography solver, and the perspective /
//! affine resampling operations. It knows nothing about file formats or
//! detection heuristics.

mod homography;
mod image;
mod logger;
mod quad;
mod warp;

pub use homography::Homography;
pub use image::{
    sample_bilinear, sample_bilinear_rgb, sample_bilinear_u8, GrayImage, GrayImageView, Image,
    ImageError, RgbImage, RgbImageView,
};
pub use quad::{order_corners, Quad, QuadError};
pub use warp::{rectify, rotate, RectifyError};

pub use logger::init_with_level;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
