//! Validated document quadrilaterals.
//!
//! A [`Quad`] is an ordered set of 4 corners tracing a simple polygon. The
//! rectifier treats index 0→1 as the top edge, 1→2 as the right edge and so
//! on, so the winding must stay consistent between producer and consumer.
//! Construction validates the invariant instead of trusting callers; a quad
//! that slipped through with crossed edges would warp into a silently sheared
//! page.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum squared distance between two corners before they count as one.
const MIN_CORNER_SEP_SQ: f32 = 1e-6;
/// Minimum enclosed area in px^2.
const MIN_AREA: f32 = 1e-3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuadError {
    #[error("corners {a} and {b} coincide")]
    DuplicateCorners { a: usize, b: usize },
    #[error("corner sequence traces a self-intersecting polygon")]
    SelfIntersecting,
    #[error("corners enclose no area (collinear)")]
    ZeroArea,
}

/// An ordered, validated 4-corner polygon in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point2<f32>; 4]", into = "[Point2<f32>; 4]")]
pub struct Quad {
    corners: [Point2<f32>; 4],
}

impl Quad {
    /// Validate and wrap 4 corners in the given order.
    pub fn new(corners: [Point2<f32>; 4]) -> Result<Self, QuadError> {
        for a in 0..4 {
            for b in (a + 1)..4 {
                let d = corners[b] - corners[a];
                if d.norm_squared() < MIN_CORNER_SEP_SQ {
                    return Err(QuadError::DuplicateCorners { a, b });
                }
            }
        }
        if polygon_area(&corners) < MIN_AREA {
            return Err(QuadError::ZeroArea);
        }
        // Adjacent edges share an endpoint; only opposite edges can cross.
        if segments_cross(corners[0], corners[1], corners[2], corners[3])
            || segments_cross(corners[1], corners[2], corners[3], corners[0])
        {
            return Err(QuadError::SelfIntersecting);
        }
        Ok(Self { corners })
    }

    /// Axis-aligned rectangle with the usual TL, TR, BR, BL winding.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Result<Self, QuadError> {
        Self::new([
            Point2::new(x, y),
            Point2::new(x + width, y),
            Point2::new(x + width, y + height),
            Point2::new(x, y + height),
        ])
    }

    /// Fallback corner placement covering the whole frame.
    ///
    /// Callers use this when detection returns no document, so the user can
    /// still adjust corners starting from the image bounds.
    pub fn full_frame(width: usize, height: usize) -> Result<Self, QuadError> {
        Self::from_rect(0.0, 0.0, width as f32, height as f32)
    }

    pub fn corners(&self) -> &[Point2<f32>; 4] {
        &self.corners
    }

    pub fn corner(&self, i: usize) -> Point2<f32> {
        self.corners[i]
    }

    /// Length of the edge from corner `i` to corner `(i + 1) % 4`.
    pub fn edge_len(&self, i: usize) -> f32 {
        (self.corners[(i + 1) % 4] - self.corners[i]).norm()
    }

    /// Enclosed area in px^2 (shoelace).
    pub fn area(&self) -> f32 {
        polygon_area(&self.corners)
    }
}

impl TryFrom<[Point2<f32>; 4]> for Quad {
    type Error = QuadError;

    fn try_from(corners: [Point2<f32>; 4]) -> Result<Self, Self::Error> {
        Self::new(corners)
    }
}

impl From<Quad> for [Point2<f32>; 4] {
    fn from(q: Quad) -> Self {
        q.corners
    }
}

/// Reorder 4 arbitrary points into TL, TR, BR, BL.
///
/// TL minimizes `x + y`, BR maximizes it; TR minimizes `y - x`, BL maximizes
/// it. This is what makes the detector's winding guarantee explicit.
pub fn order_corners(pts: [Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let mut tl = pts[0];
    let mut tr = pts[0];
    let mut br = pts[0];
    let mut bl = pts[0];
    for &p in &pts {
        if p.x + p.y < tl.x + tl.y {
            tl = p;
        }
        if p.x + p.y > br.x + br.y {
            br = p;
        }
        if p.y - p.x < tr.y - tr.x {
            tr = p;
        }
        if p.y - p.x > bl.y - bl.x {
            bl = p;
        }
    }
    [tl, tr, br, bl]
}

fn polygon_area(pts: &[Point2<f32>; 4]) -> f32 {
    let mut acc = 0.0f32;
    for i in 0..4 {
        let a = pts[i];
        let b = pts[(i + 1) % 4];
        acc += a.x * b.y - b.x * a.y;
    }
    0.5 * acc.abs()
}

#[inline]
fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Proper intersection of open segments `ab` and `cd`.
fn segments_cross(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>, d: Point2<f32>) -> bool {
    let d1 = cross(a, b, c);
    let d2 = cross(a, b, d);
    let d3 = cross(c, d, a);
    let d4 = cross(c, d, b);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_is_valid() {
        let q = Quad::from_rect(10.0, 20.0, 100.0, 50.0).unwrap();
        assert!((q.area() - 5000.0).abs() < 1e-2);
        assert!((q.edge_len(0) - 100.0).abs() < 1e-4);
        assert!((q.edge_len(1) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn duplicate_corners_rejected() {
        let err = Quad::new([
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(50.0, 50.0),
        ])
        .unwrap_err();
        assert_eq!(err, QuadError::DuplicateCorners { a: 0, b: 1 });
    }

    #[test]
    fn collinear_corners_rejected() {
        let err = Quad::new([
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(20.0, 20.0),
            Point2::new(30.0, 30.0),
        ])
        .unwrap_err();
        assert_eq!(err, QuadError::ZeroArea);
    }

    #[test]
    fn bowtie_rejected() {
        // 0-1 and 2-3 cross: the hourglass shape a careless corner drag makes.
        let err = Quad::new([
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(100.0, 0.0),
            Point2::new(0.0, 100.0),
        ])
        .unwrap_err();
        assert_eq!(err, QuadError::SelfIntersecting);
    }

    #[test]
    fn order_corners_normalizes_any_permutation() {
        let tl = Point2::new(10.0, 15.0);
        let tr = Point2::new(90.0, 18.0);
        let br = Point2::new(88.0, 130.0);
        let bl = Point2::new(12.0, 127.0);
        for perm in [[br, tl, bl, tr], [tr, br, tl, bl], [bl, tr, br, tl]] {
            assert_eq!(order_corners(perm), [tl, tr, br, bl]);
        }
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let q = Quad::from_rect(0.0, 0.0, 4.0, 3.0).unwrap();
        let s = serde_json::to_string(&q).unwrap();
        let back: Quad = serde_json::from_str(&s).unwrap();
        assert_eq!(back, q);

        // A serialized bowtie must not deserialize into a Quad.
        let bad = "[[0.0,0.0],[100.0,100.0],[100.0,0.0],[0.0,100.0]]";
        assert!(serde_json::from_str::<Quad>(bad).is_err());
    }
}
