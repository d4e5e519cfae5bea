//! Pixel containers and sampling.
//!
//! Two channel layouts exist: single-channel intensity (`GrayImage`) and
//! interleaved 3-channel color (`RgbImage`). `Image` wraps either so that the
//! processing operations can accept both and hand back the caller's layout.
//! Out-of-bounds reads sample as black.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("empty image ({width}x{height})")]
    Empty { width: usize, height: usize },
    #[error("buffer length mismatch (expected {expected} bytes, got {got})")]
    BufferMismatch { expected: usize, got: usize },
}

/// Borrowed single-channel view, row-major, `len = width * height`.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned single-channel image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new_fill(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width * height;
        if data.len() != expected {
            return Err(ImageError::BufferMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn as_view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Borrowed 3-channel view, interleaved RGB, `len = width * height * 3`.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned 3-channel image, interleaved RGB, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn new_fill(width: usize, height: usize, value: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&value);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(ImageError::BufferMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn as_view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// An image in either supported channel layout.
///
/// Operations never mutate their input; every processing step allocates a
/// fresh `Image` in the same layout as the input unless documented otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Image {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Image {
    pub fn width(&self) -> usize {
        match self {
            Image::Gray(g) => g.width,
            Image::Rgb(c) => c.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Image::Gray(g) => g.height,
            Image::Rgb(c) => c.height,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Image::Gray(_) => 1,
            Image::Rgb(_) => 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// BT.601 luma conversion. A gray input is cloned as-is.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            Image::Gray(g) => g.clone(),
            Image::Rgb(c) => {
                let mut data = Vec::with_capacity(c.width * c.height);
                for px in c.data.chunks_exact(3) {
                    data.push(luma(px[0], px[1], px[2]));
                }
                GrayImage {
                    width: c.width,
                    height: c.height,
                    data,
                }
            }
        }
    }

    /// Wrap a single-channel result back into this image's channel layout.
    ///
    /// Used by filters that compute on intensity but must hand back the
    /// caller's layout: for an RGB input the channel is replicated.
    pub fn expand_gray(&self, gray: GrayImage) -> Image {
        match self {
            Image::Gray(_) => Image::Gray(gray),
            Image::Rgb(_) => {
                let mut data = Vec::with_capacity(gray.data.len() * 3);
                for &v in &gray.data {
                    data.extend_from_slice(&[v, v, v]);
                }
                Image::Rgb(RgbImage {
                    width: gray.width,
                    height: gray.height,
                    data,
                })
            }
        }
    }
}

impl From<GrayImage> for Image {
    fn from(g: GrayImage) -> Self {
        Image::Gray(g)
    }
}

impl From<RgbImage> for Image {
    fn from(c: RgbImage) -> Self {
        Image::Rgb(c)
    }
}

#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
fn get_rgb(src: &RgbImageView<'_>, x: i32, y: i32) -> [u8; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0, 0, 0];
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [src.data[i], src.data[i + 1], src.data[i + 2]]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}

#[inline]
pub fn sample_bilinear_rgb(src: &RgbImageView<'_>, x: f32, y: f32) -> [u8; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let b = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        out[c] = (a + fy * (b - a)).clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(matches!(
            GrayImage::from_vec(4, 4, vec![0u8; 15]),
            Err(ImageError::BufferMismatch {
                expected: 16,
                got: 15
            })
        ));
        assert!(RgbImage::from_vec(2, 2, vec![0u8; 12]).is_ok());
    }

    #[test]
    fn luma_matches_bt601_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        // pure green is the heaviest channel
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));
    }

    #[test]
    fn to_gray_on_gray_is_identity() {
        let g = GrayImage::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        let img = Image::Gray(g.clone());
        assert_eq!(img.to_gray(), g);
    }

    #[test]
    fn expand_gray_replicates_channels_for_rgb() {
        let rgb = Image::Rgb(RgbImage::new_fill(2, 1, [10, 20, 30]));
        let gray = GrayImage::from_vec(2, 1, vec![7, 9]).unwrap();
        match rgb.expand_gray(gray) {
            Image::Rgb(out) => assert_eq!(out.data, vec![7, 7, 7, 9, 9, 9]),
            Image::Gray(_) => panic!("layout must follow the source image"),
        }
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let g = GrayImage::from_vec(2, 1, vec![0, 100]).unwrap();
        let v = sample_bilinear(&g.as_view(), 0.5, 0.0);
        assert!((v - 50.0).abs() < 1e-4);
    }

    #[test]
    fn bilinear_outside_reads_black() {
        let g = GrayImage::new_fill(2, 2, 255);
        assert_eq!(sample_bilinear_u8(&g.as_view(), -5.0, 0.0), 0);
        let rgb = RgbImage::new_fill(2, 2, [255, 255, 255]);
        assert_eq!(sample_bilinear_rgb(&rgb.as_view(), 0.0, 10.0), [0, 0, 0]);
    }
}
