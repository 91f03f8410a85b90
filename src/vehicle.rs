use self::acceleration::{AccelerationModel, Leader, ModelParams, MAX_DECEL};
use crate::error::Error;
use crate::{SegmentId, VehicleId};
use smallvec::SmallVec;

pub(crate) mod acceleration;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    id: VehicleId,
    /// The vehicle's length in m.
    length: f64,
    /// The acceleration model
    model: AccelerationModel,
    /// The longitudinal position along the current segment, in m.
    pos: f64,
    /// The velocity in m/s.
    vel: f64,
    /// The acceleration applied in the last step, in m/s^2.
    acc: f64,
    /// The vehicle's route.
    route: SmallVec<[SegmentId; 8]>,
    /// The index of the current segment in the route.
    route_idx: usize,
}

/// The configuration of a vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VehicleConfig {
    /// The segments the vehicle will travel along, in order.
    /// A vehicle with an empty route never enters the network.
    pub route: Vec<SegmentId>,
    /// The initial position along the first segment of the route, in m.
    pub pos: f64,
    /// The initial velocity in m/s.
    pub vel: f64,
    /// The vehicle length in m.
    pub length: f64,
    /// The velocity the vehicle drives at in free flow, in m/s.
    pub desired_velocity: f64,
    /// The maximum acceleration of the vehicle, in m/s^2.
    pub max_acceleration: f64,
    /// The comfortable deceleration of the vehicle, a positive number in m/s^2.
    pub comf_deceleration: f64,
    /// The gap kept to the vehicle ahead when stopped, in m.
    pub min_gap: f64,
    /// The desired time gap to the vehicle ahead, in s.
    pub time_headway: f64,
}

/// Where a vehicle is in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleState {
    /// The vehicle has an empty route and is not on any segment.
    Unattached,
    /// The vehicle is on the segment at `route_idx` of its route.
    InTransit {
        segment: SegmentId,
        route_idx: usize,
    },
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            route: vec![],
            pos: 0.0,
            vel: 0.0,
            length: 4.0,
            desired_velocity: 16.6,
            max_acceleration: 1.44,
            comf_deceleration: 4.61,
            min_gap: 4.0,
            time_headway: 1.0,
        }
    }
}

impl VehicleConfig {
    /// Checks that the configuration describes a physically meaningful vehicle.
    pub fn validate(&self) -> Result<(), Error> {
        let values = [
            self.pos,
            self.vel,
            self.length,
            self.desired_velocity,
            self.max_acceleration,
            self.comf_deceleration,
            self.min_gap,
            self.time_headway,
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidVehicle("parameters must be finite"));
        }
        if self.desired_velocity <= 0.0 {
            return Err(Error::InvalidVehicle("desired velocity must be positive"));
        }
        if self.max_acceleration <= 0.0 {
            return Err(Error::InvalidVehicle("maximum acceleration must be positive"));
        }
        if self.comf_deceleration <= 0.0 {
            return Err(Error::InvalidVehicle("comfortable deceleration must be positive"));
        }
        if self.min_gap < 0.0 || self.time_headway < 0.0 || self.length < 0.0 {
            return Err(Error::InvalidVehicle("gap, headway and length must not be negative"));
        }
        if self.pos < 0.0 || self.vel < 0.0 {
            return Err(Error::InvalidVehicle("initial position and velocity must not be negative"));
        }
        Ok(())
    }
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(id: VehicleId, config: &VehicleConfig) -> Self {
        Self {
            id,
            length: config.length,
            model: AccelerationModel::new(&ModelParams {
                desired_velocity: config.desired_velocity,
                max_acceleration: config.max_acceleration,
                comf_deceleration: config.comf_deceleration,
                min_gap: config.min_gap,
                time_headway: config.time_headway,
            }),
            pos: config.pos,
            vel: config.vel,
            acc: 0.0,
            route: config.route.iter().copied().collect(),
            route_idx: 0,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The longitudinal position of the front of the vehicle along its current segment, in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The acceleration applied during the last step, in m/s^2.
    pub fn acc(&self) -> f64 {
        self.acc
    }

    /// The vehicle's route.
    pub fn route(&self) -> &[SegmentId] {
        &self.route
    }

    /// The index of the current segment within the route.
    pub fn route_idx(&self) -> usize {
        self.route_idx
    }

    /// The ID of the segment the vehicle is currently travelling on.
    pub fn segment_id(&self) -> Option<SegmentId> {
        self.route.get(self.route_idx).copied()
    }

    /// The ID of the segment after the current one, if the route continues.
    pub fn next_segment_id(&self) -> Option<SegmentId> {
        self.route.get(self.route_idx + 1).copied()
    }

    /// Where the vehicle is in the network.
    pub fn state(&self) -> VehicleState {
        match self.segment_id() {
            Some(segment) => VehicleState::InTransit {
                segment,
                route_idx: self.route_idx,
            },
            None => VehicleState::Unattached,
        }
    }

    /// The state seen by a vehicle following this one.
    pub(crate) fn as_leader(&self) -> Leader {
        Leader {
            pos: self.pos,
            vel: self.vel,
            length: self.length,
        }
    }

    /// Applies the car following model and integrates the vehicle's velocity and position.
    ///
    /// The velocity is integrated with the explicit Euler method and the position with the
    /// trapezoidal rule. A vehicle which would reverse instead stops where its velocity
    /// reaches zero.
    ///
    /// # Parameters
    /// * `leader` - The vehicle immediately ahead on the same segment, already updated this step.
    ///   The vehicle is held behind its rear, or level with it if the two already overlap
    /// * `dt` - The time step in seconds
    /// * `frozen` - Whether to brake maximally instead of following the model
    pub(crate) fn integrate(&mut self, leader: Option<&Leader>, dt: f64, frozen: bool) {
        let acc = if frozen {
            MAX_DECEL
        } else {
            self.model.acceleration(self.pos, self.vel, leader)
        };

        let prev_pos = self.pos;
        let vel = self.vel + dt * acc;
        if vel < 0.0 {
            self.pos -= 0.5 * self.vel * self.vel / acc;
            self.vel = 0.0;
        } else {
            self.pos += 0.5 * (self.vel + vel) * dt;
            self.vel = vel;
        }
        self.acc = acc;

        // Never pass the leader's rear, or the leader itself when already overlapping it
        if let Some(leader) = leader {
            let rear = leader.pos - leader.length;
            let limit = if rear >= prev_pos { rear } else { leader.pos };
            if self.pos > limit {
                self.pos = limit;
                self.vel = f64::min(self.vel, leader.vel);
            }
        }
    }

    /// Moves the vehicle to the start of the next segment on its route.
    pub(crate) fn advance(&mut self) {
        self.route_idx += 1;
        self.pos = 0.0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use slotmap::KeyData;

    fn vehicle(config: &VehicleConfig) -> Vehicle {
        Vehicle::new(VehicleId::from(KeyData::from_ffi(1)), config)
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(VehicleConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let configs = [
            VehicleConfig {
                desired_velocity: 0.0,
                ..Default::default()
            },
            VehicleConfig {
                comf_deceleration: -4.61,
                ..Default::default()
            },
            VehicleConfig {
                vel: -1.0,
                ..Default::default()
            },
            VehicleConfig {
                time_headway: f64::NAN,
                ..Default::default()
            },
        ];
        for config in configs {
            assert!(matches!(config.validate(), Err(Error::InvalidVehicle(_))));
        }
    }

    #[test]
    fn accelerates_from_rest() {
        let mut veh = vehicle(&VehicleConfig::default());
        veh.integrate(None, 0.5, false);
        assert_approx_eq!(veh.acc(), 1.44);
        assert_approx_eq!(veh.vel(), 0.72);
        assert_approx_eq!(veh.pos(), 0.18);
    }

    #[test]
    fn braking_stops_without_reversing() {
        let mut veh = vehicle(&VehicleConfig {
            vel: 3.0,
            ..Default::default()
        });
        veh.integrate(None, 1.0, true);
        assert_eq!(veh.vel(), 0.0);
        assert_approx_eq!(veh.pos(), 0.75);

        veh.integrate(None, 1.0, true);
        assert_eq!(veh.vel(), 0.0);
        assert_approx_eq!(veh.pos(), 0.75);
    }

    #[test]
    fn overlapping_follower_does_not_pass_leader() {
        let mut veh = vehicle(&VehicleConfig {
            vel: 16.6,
            ..Default::default()
        });
        let leader = Leader {
            pos: 0.0,
            vel: 0.0,
            length: 4.0,
        };
        veh.integrate(Some(&leader), 1.0 / 60.0, false);
        assert_eq!(veh.pos(), 0.0);
        assert_eq!(veh.vel(), 0.0);
    }

    #[test]
    fn follower_is_held_behind_leader_rear() {
        let mut veh = vehicle(&VehicleConfig {
            pos: 10.0,
            vel: 30.0,
            ..Default::default()
        });
        let leader = Leader {
            pos: 14.5,
            vel: 2.0,
            length: 4.0,
        };
        // Braking at the maximum rate alone would carry it well past the leader
        veh.integrate(Some(&leader), 0.5, true);
        assert_eq!(veh.pos(), 10.5);
        assert_eq!(veh.vel(), 2.0);
    }

    #[test]
    fn route_is_followed_in_order() {
        let mut veh = vehicle(&VehicleConfig {
            route: vec![SegmentId(3), SegmentId(7)],
            pos: 12.0,
            ..Default::default()
        });
        assert_eq!(
            veh.state(),
            VehicleState::InTransit {
                segment: SegmentId(3),
                route_idx: 0
            }
        );
        assert_eq!(veh.next_segment_id(), Some(SegmentId(7)));

        veh.advance();
        assert_eq!(veh.segment_id(), Some(SegmentId(7)));
        assert_eq!(veh.next_segment_id(), None);
        assert_eq!(veh.pos(), 0.0);
    }

    #[test]
    fn empty_route_is_unattached() {
        let veh = vehicle(&VehicleConfig::default());
        assert_eq!(veh.state(), VehicleState::Unattached);
        assert_eq!(veh.segment_id(), None);
    }
}
