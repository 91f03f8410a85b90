//! Mathematical structs and functions.

pub use bezier::{CubicBezier2d, LineSegment2d, QuadraticBezier2d};
use cgmath::{Point2, Vector2};
pub use curve::{resample_arc_length, ArcLengthSamples, ParametricCurve2d};

mod bezier;
mod curve;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
