use std::collections::HashSet;
use traffic_flow::Simulation;

/// Checks that every segment's vehicles are ordered by position, and that
/// no vehicle is on more than one segment.
pub fn check_invariants(sim: &Simulation) {
    let mut seen = HashSet::new();
    for segment in sim.iter_segments() {
        let mut last = f64::INFINITY;
        for vehicle_id in segment.iter_vehicles() {
            assert!(seen.insert(vehicle_id), "{vehicle_id:?} is on two segments");
            let vehicle = sim.get_vehicle(vehicle_id).expect("queued vehicle exists");
            assert_eq!(vehicle.segment_id(), Some(segment.id()));
            assert!(vehicle.pos() <= last, "vehicles on {} overtook", segment.id());
            last = vehicle.pos();
        }
    }
}
