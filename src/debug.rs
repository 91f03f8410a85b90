use crate::Simulation;
use serde_json::json;

/// Describes the state of the network after the last completed frame,
/// for consumption by an external viewer.
pub fn debug_frame(sim: &Simulation) -> serde_json::Value {
    let segments = sim
        .iter_segments()
        .map(|segment| {
            json!({
                "id": segment.id(),
                "length": segment.length(),
                "points": segment.points().iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
                "vehicles": segment.iter_vehicles().count(),
            })
        })
        .collect::<Vec<_>>();

    let vehicles = sim
        .iter_vehicles()
        .filter_map(|vehicle| {
            let pos = sim.vehicle_position(vehicle.id())?;
            let dir = sim.vehicle_direction(vehicle.id())?;
            Some(json!({
                "segment": vehicle.segment_id(),
                "x": vehicle.pos(),
                "v": vehicle.vel(),
                "position": [pos.x, pos.y],
                "direction": [dir.x, dir.y],
            }))
        })
        .collect::<Vec<_>>();

    json!({
        "frame": sim.frame(),
        "time": sim.time(),
        "segments": segments,
        "vehicles": vehicles,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::{SegmentId, VehicleConfig};

    #[test]
    fn frame_lists_live_vehicles() {
        let mut sim = Simulation::new();
        sim.create_segment(SegmentId(0), Point2d::new(0.0, 0.0), Point2d::new(50.0, 0.0))
            .unwrap();
        sim.add_vehicle(&VehicleConfig {
            route: vec![SegmentId(0)],
            ..Default::default()
        })
        .unwrap();
        sim.add_vehicle(&VehicleConfig::default()).unwrap();
        sim.update().unwrap();

        let frame = sim.debug();
        assert_eq!(frame["frame"], 1);
        assert_eq!(frame["segments"][0]["id"], 0);
        assert_eq!(frame["vehicles"].as_array().unwrap().len(), 1);
        assert_eq!(frame["vehicles"][0]["segment"], 0);
    }
}
