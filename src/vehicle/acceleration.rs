/// The maximum deceleration of all vehicles in ms<sup>-2</sup>.
pub const MAX_DECEL: f64 = -6.0; // m/s^2

/// Gaps below this distance are treated as this distance, in m.
const MIN_NET_DIST: f64 = 0.01; // m

/// The car following model of a vehicle, based on the intelligent driver model.
#[derive(Clone, Debug)]
pub struct AccelerationModel {
    desired_vel: f64,
    max_acc: f64,
    min_gap: f64,
    headway: f64,
    /// Precomputed `2 * sqrt(max_acc * comf_dec)`.
    sqrt_ab: f64,
}

/// The parameters of the acceleration model.
pub struct ModelParams {
    /// The velocity the vehicle drives at in free flow, in m/s.
    pub desired_velocity: f64,
    /// The vehicle's maximum acceleration in m/s<sup>2</sup>.
    pub max_acceleration: f64,
    /// The comfortable decelleration in m/s<sup>2</sup>, a positive number.
    pub comf_deceleration: f64,
    /// The minimum gap to keep to the vehicle ahead when stopped, in m.
    pub min_gap: f64,
    /// The desired gap between this and the vehicle ahead in seconds.
    pub time_headway: f64,
}

/// The state of the vehicle being followed.
#[derive(Clone, Copy, Debug)]
pub struct Leader {
    /// The longitudinal position of the leader in m.
    pub pos: f64,
    /// The leader's velocity in m/s.
    pub vel: f64,
    /// The leader's length in m.
    pub length: f64,
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &ModelParams) -> Self {
        AccelerationModel {
            desired_vel: params.desired_velocity,
            max_acc: params.max_acceleration,
            min_gap: params.min_gap,
            headway: params.time_headway,
            sqrt_ab: 2.0 * (params.max_acceleration * params.comf_deceleration).sqrt(),
        }
    }

    /// Computes the acceleration of a vehicle at `pos` travelling at `vel`.
    ///
    /// Without a leader the vehicle accelerates towards its desired velocity.
    /// With one, it also brakes to keep a safe gap behind the leader's rear.
    pub fn acceleration(&self, pos: f64, vel: f64, leader: Option<&Leader>) -> f64 {
        let free = 1.0 - (vel / self.desired_vel).powi(4);
        let interaction = match leader {
            Some(leader) => {
                let net_dist = f64::max(leader.pos - pos - leader.length, MIN_NET_DIST);
                let ss = self.desired_gap(vel, leader.vel);
                (ss / net_dist).powi(2)
            }
            None => 0.0,
        };
        self.max_acc * (free - interaction)
    }

    /// The desired dynamic gap to a leader travelling at `their_vel`.
    fn desired_gap(&self, my_vel: f64, their_vel: f64) -> f64 {
        let appr = my_vel - their_vel;
        self.min_gap + f64::max(0.0, my_vel * self.headway + my_vel * appr / self.sqrt_ab)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn model() -> AccelerationModel {
        AccelerationModel::new(&ModelParams {
            desired_velocity: 16.6,
            max_acceleration: 1.44,
            comf_deceleration: 4.61,
            min_gap: 4.0,
            time_headway: 1.0,
        })
    }

    #[test]
    fn free_flow() {
        let acc = model();
        assert_approx_eq!(acc.acceleration(0.0, 0.0, None), 1.44);
        assert_approx_eq!(acc.acceleration(0.0, 16.6, None), 0.0);
        assert!(acc.acceleration(0.0, 20.0, None) < 0.0);
    }

    #[test]
    fn brakes_harder_as_gap_shrinks() {
        let acc = model();
        let mut last = f64::INFINITY;
        for pos in [5.0, 10.0, 20.0, 25.0, 28.0, 30.0] {
            let leader = Leader {
                pos: 40.0,
                vel: 0.0,
                length: 4.0,
            };
            let a = acc.acceleration(pos, 10.0, Some(&leader));
            assert!(a <= 0.0);
            assert!(a < last);
            last = a;
        }
    }

    #[test]
    fn overlapping_leader_gives_finite_braking() {
        let leader = Leader {
            pos: 5.0,
            vel: 0.0,
            length: 4.0,
        };
        let a = model().acceleration(5.0, 3.0, Some(&leader));
        assert!(a.is_finite());
        assert!(a < MAX_DECEL);
    }
}
