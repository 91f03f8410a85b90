use crate::error::GeometryError;
use crate::math::{resample_arc_length, ArcLengthSamples, ParametricCurve2d, Point2d, Vector2d};
use cgmath::prelude::*;

/// The centre line of a segment, parameterised by arc length.
#[derive(Clone, Debug)]
pub struct SegmentCurve {
    samples: ArcLengthSamples,
}

/// The result of sampling a [SegmentCurve].
#[derive(Clone, Copy, Debug)]
pub struct SegmentSample {
    /// The position on the curve.
    pub pos: Point2d,
    /// The tangent unit vector of the curve.
    pub tan: Vector2d,
}

impl SegmentCurve {
    /// Creates a new [SegmentCurve] by resampling the given parametric curve
    /// with `resolution` points.
    pub fn new(curve: &impl ParametricCurve2d, resolution: usize) -> Result<Self, GeometryError> {
        let samples = resample_arc_length(curve, resolution)?;
        Ok(Self { samples })
    }

    /// The length of the curve in m.
    pub fn length(&self) -> f64 {
        self.samples.length()
    }

    /// The polyline approximating the curve.
    pub fn points(&self) -> &[Point2d] {
        &self.samples.points
    }

    /// Samples the curve and returns the position and tangent unit vector.
    ///
    /// # Parameters
    /// * `pos` - The longitudinal position along the curve, clamped to its length
    pub fn sample(&self, pos: f64) -> SegmentSample {
        let (idx, f) = self.sample_internal(pos);
        let points = &self.samples.points;
        let tangents = &self.samples.tangents;

        let p = points[idx].to_vec().lerp(points[idx + 1].to_vec(), f);
        let tan = tangents[idx].lerp(tangents[idx + 1], f);
        let tan = if tan.magnitude() > 1e-6 {
            tan.normalize()
        } else {
            tangents[idx]
        };

        SegmentSample {
            pos: Point2d::from_vec(p),
            tan,
        }
    }

    /// Finds the pair of samples bracketing `pos`.
    /// Returns the index of the first sample and the fraction of the way to the second.
    fn sample_internal(&self, pos: f64) -> (usize, f64) {
        let dists = &self.samples.distances;
        let pos = pos.clamp(0.0, self.length());
        let idx = dists.partition_point(|d| *d <= pos).clamp(1, dists.len() - 1) - 1;
        let span = dists[idx + 1] - dists[idx];
        let f = if span > 0.0 {
            (pos - dists[idx]) / span
        } else {
            0.0
        };
        (idx, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{LineSegment2d, QuadraticBezier2d};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn straight_curve_interpolates_linearly() {
        let line = LineSegment2d::from_ends(Point2d::new(0.0, 5.0), Point2d::new(100.0, 5.0));
        let curve = SegmentCurve::new(&line, 50).unwrap();
        assert_approx_eq!(curve.length(), 100.0);
        for i in 0..=40 {
            let pos = 2.5 * i as f64;
            let sample = curve.sample(pos);
            assert_approx_eq!(sample.pos.x, pos);
            assert_approx_eq!(sample.pos.y, 5.0);
            assert_approx_eq!(sample.tan.x, 1.0);
        }
    }

    #[test]
    fn sampling_is_clamped_to_the_curve() {
        let line = LineSegment2d::from_ends(Point2d::new(0.0, 0.0), Point2d::new(0.0, 50.0));
        let curve = SegmentCurve::new(&line, 50).unwrap();
        assert_approx_eq!(curve.sample(-3.0).pos.y, 0.0);
        assert_approx_eq!(curve.sample(51.0).pos.y, 50.0);
    }

    #[test]
    fn curve_is_arclength_parameterised() {
        let curve = QuadraticBezier2d::new(&[
            Point2d::new(10.0, 10.0),
            Point2d::new(60.0, 40.0),
            Point2d::new(100.0, 45.0),
        ]);
        let curve = SegmentCurve::new(&curve, 200).unwrap();

        let ts = (0..100)
            .map(|i| i as f64 * 0.01 * curve.length())
            .collect::<Vec<_>>();
        for ts in ts.windows(2) {
            let p1 = curve.sample(ts[0]).pos;
            let p2 = curve.sample(ts[1]).pos;
            assert_approx_eq!((p2 - p1).magnitude(), ts[1] - ts[0], 0.01);
        }
    }

    #[test]
    fn tangent_follows_the_turn() {
        let curve = QuadraticBezier2d::new(&[
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
        ]);
        let curve = SegmentCurve::new(&curve, 50).unwrap();
        let start = curve.sample(0.0).tan;
        let mid = curve.sample(0.5 * curve.length()).tan;
        let end = curve.sample(curve.length()).tan;
        assert_approx_eq!(start.x, 1.0);
        assert_approx_eq!(mid.x, mid.y, 1e-3);
        assert_approx_eq!(end.y, 1.0);
        assert_approx_eq!(mid.magnitude(), 1.0);
    }
}
