//! Closed-contour extraction and polygon simplification.
//!
//! Connected edge components are discovered in scan order (top-to-bottom,
//! left-to-right) and each component's outer boundary is traced with
//! Moore neighbor following, yielding one closed contour per component.
//! Contours never leave this crate; the detector reduces them to candidate
//! quadrilaterals.

use nalgebra::Point2;
use scandoc_core::GrayImageView;

/// A traced closed boundary; the last point connects back to the first.
#[derive(Clone, Debug)]
pub struct Contour {
    pub points: Vec<Point2<f32>>,
}

impl Contour {
    /// Enclosed area in px^2 (shoelace over boundary pixel centers).
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0f32;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        0.5 * acc.abs()
    }

    /// Closed arc length.
    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut acc = 0.0f32;
        for i in 0..n {
            acc += (self.points[(i + 1) % n] - self.points[i]).norm();
        }
        acc
    }
}

// 8-neighborhood in clockwise order (y grows downward).
const DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Trace the outer boundary of every 8-connected nonzero component.
pub fn trace_contours(edges: &GrayImageView<'_>) -> Vec<Contour> {
    let w = edges.width;
    let h = edges.height;
    let mut out = Vec::new();
    if w == 0 || h == 0 {
        return out;
    }

    let fg = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && x < w as i32 && y < h as i32 && edges.data[y as usize * w + x as usize] != 0
    };

    let mut claimed = vec![false; w * h];
    let mut queue = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            let idx = sy * w + sx;
            if edges.data[idx] == 0 || claimed[idx] {
                continue;
            }

            // Scan order means (sx, sy) is the component's topmost-leftmost
            // pixel, a valid Moore trace start.
            let boundary = trace_boundary((sx as i32, sy as i32), &fg);

            // Flood the whole component so it is traced once.
            claimed[idx] = true;
            queue.clear();
            queue.push((sx as i32, sy as i32));
            while let Some((x, y)) = queue.pop() {
                for d in 0..8 {
                    let nx = x + DX[d];
                    let ny = y + DY[d];
                    if fg(nx, ny) {
                        let nidx = ny as usize * w + nx as usize;
                        if !claimed[nidx] {
                            claimed[nidx] = true;
                            queue.push((nx, ny));
                        }
                    }
                }
            }

            out.push(Contour {
                points: boundary
                    .into_iter()
                    .map(|(x, y)| Point2::new(x as f32, y as f32))
                    .collect(),
            });
        }
    }

    out
}

/// Moore neighbor tracing, clockwise, starting at the component's
/// topmost-leftmost pixel. Terminates when the start pixel is re-entered
/// toward the same second pixel as the initial step.
fn trace_boundary(start: (i32, i32), fg: &impl Fn(i32, i32) -> bool) -> Vec<(i32, i32)> {
    let mut contour = vec![start];

    // backtrack direction: the neighbor we "came from"; west of the start is
    // background by scan order
    let step = |p: (i32, i32), back: usize| -> Option<((i32, i32), usize)> {
        for k in 1..=8 {
            let d = (back + k) % 8;
            let q = (p.0 + DX[d], p.1 + DY[d]);
            if fg(q.0, q.1) {
                // new backtrack is the direction from q toward p
                return Some((q, (d + 4) % 8));
            }
        }
        None
    };

    let Some((second, mut back)) = step(start, 4) else {
        return contour; // isolated pixel
    };
    contour.push(second);
    let mut p = second;

    // generous cap; every boundary pixel is visited at most 4 times
    let cap = 8 * 1024 * 1024;
    for _ in 0..cap {
        let Some((q, nb)) = step(p, back) else {
            break;
        };
        if p == start && q == second {
            break;
        }
        contour.push(q);
        p = q;
        back = nb;
    }

    // drop the duplicated start if the trace closed on itself
    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

/// Closed-curve Douglas-Peucker simplification.
///
/// The curve is split at two far-apart anchor points and each open chain is
/// simplified independently; vertices farther than `eps` from their chord
/// survive.
pub fn approx_polygon(points: &[Point2<f32>], eps: f32) -> Vec<Point2<f32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    // anchor a: farthest from point 0; anchor b: farthest from a
    let far_from = |i: usize| -> usize {
        let mut best = i;
        let mut best_d = -1.0f32;
        for (j, p) in points.iter().enumerate() {
            let d = (p - points[i]).norm_squared();
            if d > best_d {
                best_d = d;
                best = j;
            }
        }
        best
    };
    let a = far_from(0);
    let b = far_from(a);
    let (a, b) = if a < b { (a, b) } else { (b, a) };
    if a == b {
        return vec![points[a]];
    }

    let chain_ab: Vec<Point2<f32>> = points[a..=b].to_vec();
    let mut chain_ba: Vec<Point2<f32>> = points[b..].to_vec();
    chain_ba.extend_from_slice(&points[..=a]);

    let mut out = Vec::new();
    let first = simplify_chain(&chain_ab, eps);
    let second = simplify_chain(&chain_ba, eps);
    out.extend_from_slice(&first[..first.len() - 1]);
    out.extend_from_slice(&second[..second.len() - 1]);
    out
}

/// Open-chain Douglas-Peucker; endpoints always survive.
fn simplify_chain(chain: &[Point2<f32>], eps: f32) -> Vec<Point2<f32>> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut best = lo;
        let mut best_d = 0.0f32;
        for i in (lo + 1)..hi {
            let d = segment_distance(chain[i], chain[lo], chain[hi]);
            if d > best_d {
                best_d = d;
                best = i;
            }
        }
        if best_d > eps {
            keep[best] = true;
            stack.push((lo, best));
            stack.push((best, hi));
        }
    }

    chain
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

fn segment_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-12 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
