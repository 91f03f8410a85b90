#[cfg(feature = "debug")]
use crate::debug::debug_frame;
use crate::error::Error;
use crate::generator::{GeneratorConfig, VehicleGenerator};
use crate::math::{Point2d, Vector2d};
use crate::segment::{Segment, SegmentGeometry};
use crate::vehicle::acceleration::Leader;
use crate::vehicle::{Vehicle, VehicleConfig};
use crate::{SegmentId, VehicleId, VehicleSet};
use log::{debug, warn};
use std::collections::HashMap;

/// The configuration of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SimulationConfig {
    /// The fixed time step in s.
    pub time_step: f64,
    /// The number of points each segment's curve is resampled with.
    pub resolution: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            resolution: 50,
        }
    }
}

/// A traffic simulation.
pub struct Simulation {
    /// The segments in the network, in the order they were added.
    segments: Vec<Segment>,
    /// The index of each segment in `segments`.
    segment_idx: HashMap<SegmentId, usize>,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The vehicle generators.
    generators: Vec<VehicleGenerator>,
    /// The set of "frozen" vehicles, which will not move.
    frozen_vehs: Vec<VehicleId>,
    /// The simulated time in s.
    time: f64,
    /// The fixed time step in s.
    dt: f64,
    /// The number of points each segment's curve is resampled with.
    resolution: usize,
    /// The current frame of simulation.
    frame: usize,
    /// The number of vehicles which have reached the end of their route.
    exited: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            segments: vec![],
            segment_idx: HashMap::new(),
            vehicles: VehicleSet::with_key(),
            generators: vec![],
            frozen_vehs: vec![],
            time: 0.0,
            dt: config.time_step,
            resolution: config.resolution,
            frame: 0,
            exited: 0,
        }
    }
}

impl Simulation {
    /// Creates a new simulation with a time step of 1/60 s.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new simulation with the given configuration.
    pub fn with_config(config: &SimulationConfig) -> Result<Self, Error> {
        if !config.time_step.is_finite() || config.time_step <= 0.0 {
            return Err(Error::InvalidTimeStep(config.time_step));
        }
        Ok(Self {
            dt: config.time_step,
            resolution: config.resolution,
            ..Default::default()
        })
    }

    /// Adds a segment to the network.
    ///
    /// Fails if the ID is taken or the geometry is too short to be traversed.
    pub fn add_segment(&mut self, id: SegmentId, geometry: SegmentGeometry) -> Result<(), Error> {
        if self.segment_idx.contains_key(&id) {
            return Err(Error::DuplicateSegment(id));
        }
        let segment = Segment::new(id, geometry, self.resolution)?;
        self.segment_idx.insert(id, self.segments.len());
        self.segments.push(segment);
        Ok(())
    }

    /// Adds a straight segment from `start` to `end`.
    pub fn create_segment(
        &mut self,
        id: SegmentId,
        start: Point2d,
        end: Point2d,
    ) -> Result<(), Error> {
        self.add_segment(id, SegmentGeometry::StraightLine { start, end })
    }

    /// Adds a segment following a quadratic bezier curve.
    pub fn create_quadratic_bezier_curve(
        &mut self,
        id: SegmentId,
        start: Point2d,
        control: Point2d,
        end: Point2d,
    ) -> Result<(), Error> {
        let geometry = SegmentGeometry::QuadraticCurve {
            start,
            control,
            end,
        };
        self.add_segment(id, geometry)
    }

    /// Adds a segment following a cubic bezier curve.
    pub fn create_cubic_bezier_curve(
        &mut self,
        id: SegmentId,
        start: Point2d,
        control_1: Point2d,
        control_2: Point2d,
        end: Point2d,
    ) -> Result<(), Error> {
        let geometry = SegmentGeometry::CubicCurve {
            start,
            control_1,
            control_2,
            end,
        };
        self.add_segment(id, geometry)
    }

    /// Adds a vehicle to the simulation.
    ///
    /// The vehicle is placed on the first segment of its route, which must already exist.
    /// Later segments of the route are only looked up once the vehicle reaches them.
    /// A vehicle with an empty route is kept, but never moves.
    pub fn add_vehicle(&mut self, config: &VehicleConfig) -> Result<VehicleId, Error> {
        config.validate()?;
        let first_idx = match config.route.first() {
            Some(segment) => match self.segment_idx.get(segment) {
                Some(idx) => Some(*idx),
                None => {
                    return Err(Error::UnknownSegment {
                        vehicle: None,
                        segment: *segment,
                    })
                }
            },
            None => None,
        };

        let vehicle_id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, config));
        if let Some(idx) = first_idx {
            self.segments[idx].insert_vehicle(&self.vehicles, vehicle_id);
            debug!(
                "vehicle {:?} entered segment {}",
                vehicle_id,
                self.segments[idx].id()
            );
        }
        Ok(vehicle_id)
    }

    /// Alias of [Self::add_vehicle].
    pub fn create_vehicle(&mut self, config: &VehicleConfig) -> Result<VehicleId, Error> {
        self.add_vehicle(config)
    }

    /// Removes a vehicle from the simulation.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        let vehicle = self.vehicles.remove(id)?;
        self.frozen_vehs.retain(|frozen| *frozen != id);
        if let Some(idx) = vehicle
            .segment_id()
            .and_then(|segment| self.segment_idx.get(&segment))
        {
            self.segments[*idx].remove_vehicle(id);
        }
        Some(vehicle)
    }

    /// Adds a vehicle generator to the simulation.
    pub fn add_vehicle_generator(&mut self, generator: VehicleGenerator) {
        self.generators.push(generator);
    }

    /// Creates a vehicle generator and adds it to the simulation.
    pub fn create_vehicle_generator(&mut self, config: &GeneratorConfig) -> Result<(), Error> {
        self.add_vehicle_generator(VehicleGenerator::new(config)?);
        Ok(())
    }

    /// Sets the `frozen` attribute of a vehicle. When a vehicle is frozen,
    /// it will maximally decelerate until its velocity is zero and remain stopped
    /// until it is no longer frozen.
    /// Unknown vehicles are ignored.
    pub fn set_vehicle_frozen(&mut self, vehicle_id: VehicleId, frozen: bool) {
        if !self.vehicles.contains_key(vehicle_id) {
            return;
        }
        let idx = self.frozen_vehs.iter().position(|id| *id == vehicle_id);
        match (frozen, idx) {
            (true, None) => {
                self.frozen_vehs.push(vehicle_id);
            }
            (false, Some(idx)) => {
                self.frozen_vehs.remove(idx);
            }
            _ => {}
        }
    }

    /// Gets the `frozen` attribute of a vehicle. [Read more](Self::set_vehicle_frozen).
    pub fn get_vehicle_frozen(&self, vehicle_id: VehicleId) -> bool {
        self.frozen_vehs.iter().any(|id| *id == vehicle_id)
    }

    /// Advances the simulation by `steps` time steps, stopping at the first step which fails.
    pub fn run(&mut self, steps: usize) -> Result<(), Error> {
        for _ in 0..steps {
            self.update()?;
        }
        Ok(())
    }

    /// Advances the simulation by one time step.
    ///
    /// If a vehicle reaches a segment which is not in the network, that vehicle stays
    /// where it is, the rest of the step completes, and the error is returned.
    pub fn update(&mut self) -> Result<(), Error> {
        self.integrate();
        let advanced = self.advance_vehicles();
        let generated = self.run_generators();
        self.time += self.dt;
        self.frame += 1;
        advanced.and(generated)
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the fixed time step in s.
    pub fn time_step(&self) -> f64 {
        self.dt
    }

    /// The number of vehicles which have left the network at the end of their route.
    pub fn exited_count(&self) -> usize {
        self.exited
    }

    /// Returns an iterator over all the segments, in the order they were added.
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over the vehicle generators.
    pub fn iter_generators(&self) -> impl Iterator<Item = &VehicleGenerator> {
        self.generators.iter()
    }

    /// Gets a reference to the segment with the given ID.
    pub fn get_segment(&self, segment_id: SegmentId) -> Option<&Segment> {
        self.segment_idx
            .get(&segment_id)
            .map(|idx| &self.segments[*idx])
    }

    /// Gets a reference to the vehicle with the given ID.
    /// Vehicles are dropped once they have left the network.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// The world space coordinates of a vehicle on the network.
    pub fn vehicle_position(&self, vehicle_id: VehicleId) -> Option<Point2d> {
        let vehicle = self.vehicles.get(vehicle_id)?;
        let segment = self.get_segment(vehicle.segment_id()?)?;
        Some(segment.position_at(vehicle.pos()))
    }

    /// A unit vector in world space aligned with a vehicle's heading.
    pub fn vehicle_direction(&self, vehicle_id: VehicleId) -> Option<Vector2d> {
        let vehicle = self.vehicles.get(vehicle_id)?;
        let segment = self.get_segment(vehicle.segment_id()?)?;
        Some(segment.tangent_at(vehicle.pos()))
    }

    /// Gets a JSON description of the current frame, for debugging.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        debug_frame(self)
    }

    /// Applies the car following model to every vehicle on the network.
    /// Each vehicle follows the one ahead of it, which has already been updated.
    fn integrate(&mut self) {
        for segment in &self.segments {
            let mut leader: Option<Leader> = None;
            for vehicle_id in segment.iter_vehicles() {
                let frozen = self.frozen_vehs.contains(&vehicle_id);
                let vehicle = &mut self.vehicles[vehicle_id];
                vehicle.integrate(leader.as_ref(), self.dt, frozen);
                leader = Some(vehicle.as_leader());
            }
        }
    }

    /// Moves the front vehicle of each segment to its next segment once it passes the end,
    /// or removes it from the simulation at the end of its route.
    fn advance_vehicles(&mut self) -> Result<(), Error> {
        let mut result = Ok(());

        for idx in 0..self.segments.len() {
            let segment = &self.segments[idx];
            let Some(vehicle_id) = segment.front() else {
                continue;
            };
            let vehicle = &self.vehicles[vehicle_id];
            if vehicle.pos() < segment.length() {
                continue;
            }

            match vehicle.next_segment_id() {
                Some(next_id) => {
                    let Some(next_idx) = self.segment_idx.get(&next_id).copied() else {
                        warn!("vehicle {vehicle_id:?} cannot enter unknown segment {next_id}");
                        if result.is_ok() {
                            result = Err(Error::UnknownSegment {
                                vehicle: Some(vehicle_id),
                                segment: next_id,
                            });
                        }
                        continue;
                    };
                    self.segments[idx].pop_front();
                    self.vehicles[vehicle_id].advance();
                    self.segments[next_idx].push_back(vehicle_id);
                    debug!("vehicle {vehicle_id:?} entered segment {next_id}");
                }
                None => {
                    self.segments[idx].pop_front();
                    self.vehicles.remove(vehicle_id);
                    self.frozen_vehs.retain(|id| *id != vehicle_id);
                    self.exited += 1;
                    debug!("vehicle {vehicle_id:?} exited the network");
                }
            }
        }

        result
    }

    /// Runs the vehicle generators and adds the vehicles they emit.
    fn run_generators(&mut self) -> Result<(), Error> {
        let mut emitted = vec![];
        for generator in &mut self.generators {
            generator.update(self.dt, |template| emitted.push(template.clone()));
        }

        let mut result = Ok(());
        for config in &emitted {
            match self.add_vehicle(config) {
                Ok(vehicle_id) => debug!("generated vehicle {vehicle_id:?}"),
                Err(err) => {
                    warn!("failed to generate vehicle: {err}");
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        result
    }
}
