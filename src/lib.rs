pub use cgmath;
pub use error::{Error, GeometryError};
pub use generator::{Arrivals, GeneratorConfig, GeneratorEntry, OvershootPolicy, VehicleGenerator};
pub use segment::{Segment, SegmentCurve, SegmentGeometry, SegmentSample};
pub use simulation::{Simulation, SimulationConfig};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
use std::fmt;
pub use vehicle::{Vehicle, VehicleConfig, VehicleState};

#[cfg(feature = "debug")]
mod debug;
mod error;
mod generator;
pub mod math;
mod segment;
mod simulation;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

/// Unique ID of a [Segment].
///
/// Segment IDs are chosen by the caller, so a vehicle's route may
/// refer to segments which are yet to be added to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SegmentId(pub u32);

impl From<u32> for SegmentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
