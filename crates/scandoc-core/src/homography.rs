//! Planar perspective transforms.
//!
//! A homography has 8 degrees of freedom and is fixed uniquely by 4 point
//! correspondences with no 3 points collinear. The solver normalizes both
//! point sets (Hartley: centroid to origin, mean distance sqrt(2)) before
//! building the 8x8 system, which keeps the LU solve well conditioned for
//! pixel-scale coordinates.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Map a point through the transform (projective division included).
    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Solve for H with `dst ~ H * src` from 4 correspondences.
    ///
    /// Returns `None` when the correspondences are degenerate (3 collinear
    /// points on either side) and no unique transform exists. Corner order
    /// must be consistent between `src` and `dst`.
    pub fn from_correspondences(
        src: &[Point2<f32>; 4],
        dst: &[Point2<f32>; 4],
    ) -> Option<Homography> {
        let (src_n, t_src) = normalize4(src);
        let (dst_n, t_dst) = normalize4(dst);

        // Unknowns [h11 h12 h13 h21 h22 h23 h31 h32], h33 = 1. Each
        // correspondence (x,y)->(u,v) contributes:
        //   h11 x + h12 y + h13 - u h31 x - u h32 y = u
        //   h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let x = src_n[k].x;
            let y = src_n[k].y;
            let u = dst_n[k].x;
            let v = dst_n[k].y;

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let x = a.lu().solve(&b)?;

        let hn = Matrix3::<f64>::new(
            x[0], x[1], x[2], //
            x[3], x[4], x[5], //
            x[6], x[7], 1.0,
        );

        // H = T_dst^{-1} * Hn * T_src, rescaled so h33 = 1.
        let h = t_dst.try_inverse()? * hn * t_src;
        let s = h[(2, 2)];
        if s.abs() < 1e-12 {
            return None;
        }
        Some(Homography::new(h / s))
    }
}

fn normalize4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let n = 4.0_f64;
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let mut out = [Point2::new(0.0_f64, 0.0_f64); 4];
    for (i, p) in pts.iter().enumerate() {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        out[i] = Point2::new(v[0], v[1]);
    }
    (out, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn recovers_known_transform_from_corners() {
        let ground_truth = Homography::new(Matrix3::new(
            0.9, 0.04, 35.0, //
            -0.03, 1.05, 60.0, //
            0.0007, -0.0003, 1.0,
        ));

        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(780.0_f32, 0.0),
            Point2::new(780.0_f32, 1120.0),
            Point2::new(0.0_f32, 1120.0),
        ];
        let page = rect.map(|p| ground_truth.apply(p));

        let recovered = Homography::from_correspondences(&rect, &page).expect("unique transform");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(390.0, 560.0),
            Point2::new(700.0, 1000.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-2);
        }
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.1, 0.08, 12.0, //
            -0.04, 0.95, 7.0, //
            0.0008, 0.0004, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(200.0_f32, 140.0),
            Point2::new(-30.0_f32, 75.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn collinear_correspondences_fail() {
        // 3 of the 4 source points on one line: rank-deficient system.
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0_f32, 10.0),
            Point2::new(20.0_f32, 20.0),
            Point2::new(0.0_f32, 30.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(100.0_f32, 0.0),
            Point2::new(100.0_f32, 100.0),
            Point2::new(0.0_f32, 100.0),
        ];
        assert!(Homography::from_correspondences(&src, &dst).is_none());
    }
}
