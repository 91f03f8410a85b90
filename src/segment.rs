use crate::error::GeometryError;
use crate::math::{CubicBezier2d, LineSegment2d, Point2d, QuadraticBezier2d, Vector2d};
use crate::{SegmentId, VehicleId, VehicleSet};
pub use curve::{SegmentCurve, SegmentSample};
use std::collections::VecDeque;

mod curve;

/// The geometric definition of a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentGeometry {
    /// A straight line from `start` to `end`.
    StraightLine { start: Point2d, end: Point2d },
    /// A quadratic bezier curve.
    QuadraticCurve {
        start: Point2d,
        control: Point2d,
        end: Point2d,
    },
    /// A cubic bezier curve.
    CubicCurve {
        start: Point2d,
        control_1: Point2d,
        control_2: Point2d,
        end: Point2d,
    },
}

impl SegmentGeometry {
    /// Approximates the geometry with `resolution` points spaced uniformly by arc length.
    pub fn resample(&self, resolution: usize) -> Result<SegmentCurve, GeometryError> {
        match *self {
            Self::StraightLine { start, end } => {
                SegmentCurve::new(&LineSegment2d::from_ends(start, end), resolution)
            }
            Self::QuadraticCurve {
                start,
                control,
                end,
            } => SegmentCurve::new(&QuadraticBezier2d::new(&[start, control, end]), resolution),
            Self::CubicCurve {
                start,
                control_1,
                control_2,
                end,
            } => SegmentCurve::new(
                &CubicBezier2d::new(&[start, control_1, control_2, end]),
                resolution,
            ),
        }
    }
}

/// A segment is a single-file track which vehicles travel along.
#[derive(Clone, Debug)]
pub struct Segment {
    /// The segment ID.
    id: SegmentId,
    /// The geometric definition of the segment.
    geometry: SegmentGeometry,
    /// The arc length parameterised centre line.
    curve: SegmentCurve,
    /// The vehicles on the segment, from the front (most advanced) to the back.
    vehicles: VecDeque<VehicleId>,
}

impl Segment {
    /// Creates a new segment.
    pub(crate) fn new(
        id: SegmentId,
        geometry: SegmentGeometry,
        resolution: usize,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            id,
            geometry,
            curve: geometry.resample(resolution)?,
            vehicles: VecDeque::new(),
        })
    }

    /// Gets the segment's ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Gets the geometric definition of the segment.
    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    /// Gets the curve representing the segment's centre line.
    pub fn curve(&self) -> &SegmentCurve {
        &self.curve
    }

    /// Gets the length of the segment in m.
    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    /// The world space coordinates at the given position along the segment.
    pub fn position_at(&self, pos: f64) -> Point2d {
        self.curve.sample(pos).pos
    }

    /// The unit tangent vector at the given position along the segment.
    pub fn tangent_at(&self, pos: f64) -> Vector2d {
        self.curve.sample(pos).tan
    }

    /// The polyline approximating the segment, for drawing.
    pub fn points(&self) -> &[Point2d] {
        self.curve.points()
    }

    /// The most advanced vehicle on the segment.
    pub fn front(&self) -> Option<VehicleId> {
        self.vehicles.front().copied()
    }

    /// The vehicle at index `idx` of the segment's queue, counting from the front.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds.
    pub fn at(&self, idx: usize) -> VehicleId {
        self.vehicles[idx]
    }

    /// The number of vehicles on the segment.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether there are no vehicles on the segment.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Whether the given vehicle is on the segment.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains(&id)
    }

    /// Iterates over the vehicles on the segment, from front to back.
    pub fn iter_vehicles(&self) -> impl DoubleEndedIterator<Item = VehicleId> + '_ {
        self.vehicles.iter().copied()
    }

    /// Appends a vehicle to the back of the queue.
    pub(crate) fn push_back(&mut self, id: VehicleId) {
        self.vehicles.push_back(id);
    }

    /// Removes the vehicle at the front of the queue.
    pub(crate) fn pop_front(&mut self) -> Option<VehicleId> {
        self.vehicles.pop_front()
    }

    /// Inserts the vehicle with the given ID into the queue, behind every
    /// vehicle which is at least as far along the segment.
    pub(crate) fn insert_vehicle(&mut self, vehicles: &VehicleSet, id: VehicleId) {
        let veh_pos = vehicles[id].pos();
        let idx = self
            .vehicles
            .iter()
            .map(|id| vehicles[*id].pos())
            .position(|pos| pos < veh_pos)
            .unwrap_or(self.vehicles.len());
        self.vehicles.insert(idx, id);
    }

    /// Removes the vehicle with the given ID from the queue.
    pub(crate) fn remove_vehicle(&mut self, id: VehicleId) {
        if let Some(idx) = self.vehicles.iter().position(|v| *v == id) {
            self.vehicles.remove(idx);
        }
    }
}
