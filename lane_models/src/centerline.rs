//! Lane centerline geometry: arc-length lookup and Frenet projection.
//!
//! # Frame convention
//! `s` is arc length along the polyline measured from its first point, in
//! meters. `l` is the signed lateral offset: positive to the left of the
//! direction of travel (right-handed, z up).

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Segments shorter than this are treated as degenerate (meters).
const MIN_SEGMENT_LEN: f64 = 1e-9;

/// Frenet coordinates of a point relative to a centerline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrenetCoord {
    /// Arc length along the centerline (m), clamped to `[0, length]`
    pub s: f64,
    /// Signed lateral offset (m), positive left of the travel direction
    pub l: f64,
}

/// A sampled lane centerline with precomputed cumulative arc length.
///
/// Consecutive duplicate samples are dropped at construction, so every
/// stored segment has strictly positive length.
#[derive(Clone, Debug)]
pub struct Centerline {
    points: Vec<Vector2<f64>>,
    /// `cum_len[i]` = arc length from `points[0]` to `points[i]`
    cum_len: Vec<f64>,
}

impl Centerline {
    /// Build from raw `[x, y]` samples. Returns `None` when fewer than two
    /// distinct points remain.
    pub fn new(raw: &[[f64; 2]]) -> Option<Self> {
        let mut points: Vec<Vector2<f64>> = Vec::with_capacity(raw.len());
        for p in raw {
            let v = Vector2::new(p[0], p[1]);
            if points
                .last()
                .map_or(true, |last| (v - last).norm() > MIN_SEGMENT_LEN)
            {
                points.push(v);
            }
        }
        if points.len() < 2 {
            return None;
        }
        let mut cum_len = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        cum_len.push(0.0);
        for w in points.windows(2) {
            acc += (w[1] - w[0]).norm();
            cum_len.push(acc);
        }
        Some(Self { points, cum_len })
    }

    /// Total arc length (m).
    pub fn length(&self) -> f64 {
        self.cum_len.last().copied().unwrap_or(0.0)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Vertex indices of the segment containing arc length `s`.
    fn segment_at(&self, s: f64) -> (usize, usize) {
        let s = s.clamp(0.0, self.length());
        let idx = self.cum_len.partition_point(|&c| c <= s);
        if idx >= self.points.len() {
            (self.points.len() - 2, self.points.len() - 1)
        } else {
            (idx - 1, idx)
        }
    }

    /// Position at arc length `s`, clamped to the polyline's extent.
    pub fn point_at(&self, s: f64) -> Vector2<f64> {
        let s = s.clamp(0.0, self.length());
        let (i, j) = self.segment_at(s);
        let seg_len = self.cum_len[j] - self.cum_len[i];
        if seg_len <= MIN_SEGMENT_LEN {
            return self.points[i];
        }
        let t = ((s - self.cum_len[i]) / seg_len).clamp(0.0, 1.0);
        self.points[i] + (self.points[j] - self.points[i]) * t
    }

    /// Heading (radians) of the segment containing arc length `s`.
    pub fn heading_at(&self, s: f64) -> f64 {
        let (i, j) = self.segment_at(s);
        let d = self.points[j] - self.points[i];
        d.y.atan2(d.x)
    }

    /// Project a world point onto the centerline.
    ///
    /// Scans all segments and keeps the closest foot point; `s` is clamped to
    /// `[0, length]`, and `l` is the signed cross-track component of the
    /// offset from the foot point.
    pub fn project(&self, p: &Vector2<f64>) -> FrenetCoord {
        let mut best = FrenetCoord::default();
        let mut best_d2 = f64::INFINITY;
        for i in 0..self.points.len() - 1 {
            let a = self.points[i];
            let b = self.points[i + 1];
            let ab = b - a;
            let seg_len2 = ab.norm_squared();
            if seg_len2 <= MIN_SEGMENT_LEN * MIN_SEGMENT_LEN {
                continue;
            }
            let t = ((p - a).dot(&ab) / seg_len2).clamp(0.0, 1.0);
            let foot = a + ab * t;
            let d2 = (p - foot).norm_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                let seg_len = seg_len2.sqrt();
                let dir = ab / seg_len;
                best = FrenetCoord {
                    s: self.cum_len[i] + t * seg_len,
                    l: dir.perp(&(p - foot)),
                };
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_east() -> Centerline {
        Centerline::new(&[[0.0, 0.0], [10.0, 0.0], [20.0, 0.0]]).expect("valid centerline")
    }

    /// Right-angle turn: east for 10 m, then north for 10 m.
    fn l_shaped() -> Centerline {
        Centerline::new(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]).expect("valid centerline")
    }

    #[test]
    fn rejects_degenerate_polylines() {
        assert!(Centerline::new(&[]).is_none());
        assert!(Centerline::new(&[[1.0, 2.0]]).is_none());
        assert!(
            Centerline::new(&[[1.0, 2.0], [1.0, 2.0]]).is_none(),
            "duplicate points collapse to a single vertex"
        );
    }

    #[test]
    fn drops_consecutive_duplicates() {
        let line = Centerline::new(&[[0.0, 0.0], [0.0, 0.0], [5.0, 0.0], [5.0, 0.0], [10.0, 0.0]])
            .expect("valid centerline");
        assert_eq!(line.num_points(), 3);
        assert_relative_eq!(line.length(), 10.0);
    }

    #[test]
    fn arc_length_and_point_lookup() {
        let line = l_shaped();
        assert_relative_eq!(line.length(), 20.0);

        let p = line.point_at(5.0);
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 0.0);

        let p = line.point_at(15.0);
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 5.0);

        // Clamped at both ends.
        let p = line.point_at(-3.0);
        assert_relative_eq!(p.x, 0.0);
        let p = line.point_at(100.0);
        assert_relative_eq!(p.y, 10.0);
    }

    #[test]
    fn heading_follows_segments() {
        let line = l_shaped();
        assert_relative_eq!(line.heading_at(5.0), 0.0);
        assert_relative_eq!(line.heading_at(15.0), std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn projection_signs_follow_travel_direction() {
        let line = straight_east();

        // Left of an east-bound lane is +y.
        let f = line.project(&Vector2::new(7.0, 2.0));
        assert_relative_eq!(f.s, 7.0, epsilon = 1e-12);
        assert_relative_eq!(f.l, 2.0, epsilon = 1e-12);

        let f = line.project(&Vector2::new(13.0, -1.5));
        assert_relative_eq!(f.s, 13.0, epsilon = 1e-12);
        assert_relative_eq!(f.l, -1.5, epsilon = 1e-12);
    }

    #[test]
    fn projection_clamps_beyond_endpoints() {
        let line = straight_east();

        let f = line.project(&Vector2::new(-5.0, 1.0));
        assert_relative_eq!(f.s, 0.0);
        assert_relative_eq!(f.l, 1.0, epsilon = 1e-12);

        let f = line.project(&Vector2::new(25.0, -2.0));
        assert_relative_eq!(f.s, 20.0);
        assert_relative_eq!(f.l, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn projection_picks_nearest_segment_of_a_turn() {
        let line = l_shaped();

        // Clearly alongside the second (northbound) leg; left of north is -x.
        let f = line.project(&Vector2::new(9.0, 6.0));
        assert_relative_eq!(f.s, 16.0, epsilon = 1e-12);
        assert_relative_eq!(f.l, 1.0, epsilon = 1e-12);

        // Alongside the first (eastbound) leg.
        let f = line.project(&Vector2::new(4.0, -1.0));
        assert_relative_eq!(f.s, 4.0, epsilon = 1e-12);
        assert_relative_eq!(f.l, -1.0, epsilon = 1e-12);
    }
}
