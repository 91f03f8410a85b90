use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// A straight line between two points.
#[derive(Copy, Clone, Debug)]
pub struct LineSegment2d {
    points: [Point2d; 2],
}

impl LineSegment2d {
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self {
            points: [start, end],
        }
    }
}

impl ParametricCurve2d for LineSegment2d {
    fn sample(&self, t: f64) -> Point2d {
        Point2d::from_vec(self.points[0].to_vec().lerp(self.points[1].to_vec(), t))
    }

    fn sample_dt(&self, _t: f64) -> Vector2d {
        self.points[1] - self.points[0]
    }
}

/// A quadratic bezier curve
#[derive(Copy, Clone, Debug)]
pub struct QuadraticBezier2d {
    points: [Point2d; 3],
}

impl QuadraticBezier2d {
    pub const fn new(points: &[Point2d; 3]) -> Self {
        Self { points: *points }
    }
}

impl ParametricCurve2d for QuadraticBezier2d {
    fn sample(&self, t: f64) -> Point2d {
        let t1 = 1.0 - t;
        Point2d::from_vec(
            t1 * t1 * self.points[0].to_vec()
                + 2.0 * t1 * t * self.points[1].to_vec()
                + t * t * self.points[2].to_vec(),
        )
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        -2.0 * t1 * self.points[0].to_vec()
            + (2.0 - 4.0 * t) * self.points[1].to_vec()
            + 2.0 * t * self.points[2].to_vec()
    }
}

/// A cubic bezier curve
#[derive(Copy, Clone, Debug)]
pub struct CubicBezier2d {
    points: [Point2d; 4],
}

impl CubicBezier2d {
    pub const fn new(points: &[Point2d; 4]) -> Self {
        Self { points: *points }
    }
}

impl ParametricCurve2d for CubicBezier2d {
    fn sample(&self, t: f64) -> Point2d {
        let t1 = 1.0 - t;
        Point2d::from_vec(
            t1 * t1 * t1 * self.points[0].to_vec()
                + 3.0 * t1 * t1 * t * self.points[1].to_vec()
                + 3.0 * t1 * t * t * self.points[2].to_vec()
                + t * t * t * self.points[3].to_vec(),
        )
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        (-3.0 * t1 * t1) * self.points[0].to_vec()
            + (9.0 * t * t - 12.0 * t + 3.0) * self.points[1].to_vec()
            + (-9.0 * t * t + 6.0 * t) * self.points[2].to_vec()
            + (3.0 * t * t) * self.points[3].to_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Central difference of the curve position.
    fn numeric_dt(curve: &impl ParametricCurve2d, t: f64) -> Vector2d {
        let h = 1e-6;
        (curve.sample(t + h) - curve.sample(t - h)) / (2.0 * h)
    }

    #[test]
    fn bezier_ends_match_control_points() {
        let quad = QuadraticBezier2d::new(&[
            Point2d::new(0.0, 0.0),
            Point2d::new(5.0, 10.0),
            Point2d::new(10.0, 0.0),
        ]);
        assert_eq!(quad.sample(0.0), Point2d::new(0.0, 0.0));
        assert_eq!(quad.sample(1.0), Point2d::new(10.0, 0.0));

        let cubic = CubicBezier2d::new(&[
            Point2d::new(1.0, 2.0),
            Point2d::new(3.0, 8.0),
            Point2d::new(7.0, 8.0),
            Point2d::new(9.0, 2.0),
        ]);
        assert_eq!(cubic.sample(0.0), Point2d::new(1.0, 2.0));
        assert_eq!(cubic.sample(1.0), Point2d::new(9.0, 2.0));
    }

    #[test]
    fn bezier_derivatives_match_finite_differences() {
        let quad = QuadraticBezier2d::new(&[
            Point2d::new(10.0, 10.0),
            Point2d::new(60.0, 40.0),
            Point2d::new(100.0, 45.0),
        ]);
        let cubic = CubicBezier2d::new(&[
            Point2d::new(0.0, 0.0),
            Point2d::new(20.0, 40.0),
            Point2d::new(60.0, -10.0),
            Point2d::new(80.0, 30.0),
        ]);
        for t in [0.1, 0.35, 0.5, 0.8] {
            let (a, b) = (quad.sample_dt(t), numeric_dt(&quad, t));
            assert_approx_eq!(a.x, b.x, 1e-4);
            assert_approx_eq!(a.y, b.y, 1e-4);
            let (a, b) = (cubic.sample_dt(t), numeric_dt(&cubic, t));
            assert_approx_eq!(a.x, b.x, 1e-4);
            assert_approx_eq!(a.y, b.y, 1e-4);
        }
    }
}
