use crate::{SegmentId, VehicleId};
use std::fmt;

/// An error raised while building a segment's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryError {
    /// The curve is too short to be traversed.
    Degenerate { length: f64 },
    /// A curve must be resampled with at least two points.
    Resolution(usize),
}

/// An error raised by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A segment could not be constructed.
    Geometry(GeometryError),
    /// A vehicle's route refers to a segment which is not in the network.
    UnknownSegment {
        vehicle: Option<VehicleId>,
        segment: SegmentId,
    },
    /// A segment with this ID already exists.
    DuplicateSegment(SegmentId),
    /// A vehicle configuration is out of range.
    InvalidVehicle(&'static str),
    /// A vehicle generator configuration is out of range.
    InvalidGenerator(&'static str),
    /// The time step must be finite and positive.
    InvalidTimeStep(f64),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { length } => {
                write!(f, "curve is degenerate (estimated length {length})")
            }
            Self::Resolution(n) => write!(f, "resolution of {n} is below the minimum of 2"),
        }
    }
}

impl std::error::Error for GeometryError {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "invalid segment geometry: {err}"),
            Self::UnknownSegment {
                vehicle: Some(vehicle),
                segment,
            } => write!(f, "vehicle {vehicle:?} is routed onto unknown segment {segment}"),
            Self::UnknownSegment {
                vehicle: None,
                segment,
            } => write!(f, "unknown segment {segment}"),
            Self::DuplicateSegment(id) => write!(f, "segment {id} already exists"),
            Self::InvalidVehicle(reason) => write!(f, "invalid vehicle: {reason}"),
            Self::InvalidGenerator(reason) => write!(f, "invalid vehicle generator: {reason}"),
            Self::InvalidTimeStep(dt) => write!(f, "invalid time step {dt}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}
