use super::{Point2d, Vector2d};
use crate::error::GeometryError;
use cgmath::prelude::*;
use itertools::Itertools;

/// Curves whose estimated length is at or below this value, in m, are degenerate.
pub const MIN_CURVE_LENGTH: f64 = 1e-6;

/// Derivatives with a magnitude below this are treated as vanishing.
const MIN_DERIVATIVE: f64 = 1e-9;

/// A parametric curve in 2D space, defined for `t` in `[0, 1]`.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Samples the derivative of the parametric curve.
    ///
    /// The default implementation approximates the derivative by sampling
    /// two very nearby points along the curve.
    fn sample_dt(&self, t: f64) -> Vector2d {
        let delta = 0.0001;
        let (t1, t2) = if t + delta <= 1.0 {
            (t, t + delta)
        } else {
            (t - delta, t)
        };
        (self.sample(t2) - self.sample(t1)) / delta
    }
}

impl<T: ParametricCurve2d + ?Sized> ParametricCurve2d for &T {
    fn sample(&self, t: f64) -> Point2d {
        (**self).sample(t)
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        (**self).sample_dt(t)
    }
}

/// Points spaced uniformly by arc length along a curve.
#[derive(Clone, Debug)]
pub struct ArcLengthSamples {
    /// The sampled points, from the start of the curve to its end.
    pub points: Vec<Point2d>,
    /// The unit tangent vector at each point.
    pub tangents: Vec<Vector2d>,
    /// The arc length from the start of the curve to each point.
    pub distances: Vec<f64>,
}

impl ArcLengthSamples {
    /// The estimated length of the curve.
    pub fn length(&self) -> f64 {
        self.distances[self.distances.len() - 1]
    }
}

/// Approximates a curve with `resolution` points spaced uniformly by arc length.
///
/// The curve is first sampled at uniform `t` values, which gives an estimate of the
/// arc length as a function of `t`. This mapping is then inverted at uniform fractions
/// of the total length, and the curve is sampled again at the resulting `t` values.
pub fn resample_arc_length(
    curve: &impl ParametricCurve2d,
    resolution: usize,
) -> Result<ArcLengthSamples, GeometryError> {
    if resolution < 2 {
        return Err(GeometryError::Resolution(resolution));
    }
    let step = 1.0 / (resolution - 1) as f64;

    // First pass, uniform in `t`
    let ts = (0..resolution).map(|i| i as f64 * step).collect::<Vec<_>>();
    let raw_points = ts.iter().map(|t| curve.sample(*t)).collect::<Vec<_>>();
    let raw_dists = cumulative_lengths(&raw_points);
    let length = raw_dists[resolution - 1];
    if length.is_nan() || length <= MIN_CURVE_LENGTH {
        return Err(GeometryError::Degenerate { length });
    }

    // Second pass, uniform in arc length
    let mut k = 0;
    let params = (0..resolution)
        .map(|i| {
            let target = i as f64 * step * length;
            while k + 2 < resolution && raw_dists[k + 1] < target {
                k += 1;
            }
            let span = raw_dists[k + 1] - raw_dists[k];
            let f = if span > 0.0 {
                ((target - raw_dists[k]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            ts[k] + f * (ts[k + 1] - ts[k])
        })
        .collect::<Vec<_>>();

    let points = params.iter().map(|t| curve.sample(*t)).collect::<Vec<_>>();
    let tangents = params
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let dt = curve.sample_dt(*t);
            if dt.magnitude() > MIN_DERIVATIVE {
                dt.normalize()
            } else {
                chord_direction(&points, idx)
            }
        })
        .collect();
    let distances = cumulative_lengths(&points);

    Ok(ArcLengthSamples {
        points,
        tangents,
        distances,
    })
}

/// Computes the running total of the distances between consecutive points.
fn cumulative_lengths(points: &[Point2d]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(points.iter().tuple_windows().scan(0.0, |total, (a, b)| {
            *total += a.distance(*b);
            Some(*total)
        }))
        .collect()
}

/// The direction of the chord leaving the point at `idx`,
/// or arriving at it for the last point.
fn chord_direction(points: &[Point2d], idx: usize) -> Vector2d {
    let (a, b) = if idx + 1 < points.len() {
        (points[idx], points[idx + 1])
    } else {
        (points[idx - 1], points[idx])
    };
    let chord = b - a;
    if chord.magnitude() > 0.0 {
        chord.normalize()
    } else {
        Vector2d::unit_x()
    }
}
