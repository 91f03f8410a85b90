use std::time::Instant;
use traffic_flow::math::Point2d;
use traffic_flow::{Error, GeneratorConfig, GeneratorEntry, SegmentId, Simulation, VehicleConfig};

const LANE_SPACE: f64 = 3.5;
const INTERSECTION_SIZE: f64 = 12.0;
const LENGTH: f64 = 100.0;

/// Builds a four way intersection, with approaches from the south, east, north and west.
fn build_intersection(sim: &mut Simulation) -> Result<(), Error> {
    let (l, i, n) = (LANE_SPACE / 2.0, INTERSECTION_SIZE / 2.0, LENGTH + INTERSECTION_SIZE / 2.0);
    let p = Point2d::new;

    // Into the intersection
    sim.create_segment(SegmentId(0), p(l, n), p(l, i))?;
    sim.create_segment(SegmentId(1), p(n, -l), p(i, -l))?;
    sim.create_segment(SegmentId(2), p(-l, -n), p(-l, -i))?;
    sim.create_segment(SegmentId(3), p(-n, l), p(-i, l))?;
    // Out of the intersection
    sim.create_segment(SegmentId(4), p(-l, i), p(-l, n))?;
    sim.create_segment(SegmentId(5), p(i, l), p(n, l))?;
    sim.create_segment(SegmentId(6), p(l, -i), p(l, -n))?;
    sim.create_segment(SegmentId(7), p(-i, -l), p(-n, -l))?;
    // Straight through
    sim.create_segment(SegmentId(8), p(l, i), p(l, -i))?;
    sim.create_segment(SegmentId(9), p(i, -l), p(-i, -l))?;
    sim.create_segment(SegmentId(10), p(-l, -i), p(-l, i))?;
    sim.create_segment(SegmentId(11), p(-i, l), p(i, l))?;
    // Right turns
    sim.create_quadratic_bezier_curve(SegmentId(12), p(l, i), p(l, l), p(i, l))?;
    sim.create_quadratic_bezier_curve(SegmentId(13), p(i, -l), p(l, -l), p(l, -i))?;
    sim.create_quadratic_bezier_curve(SegmentId(14), p(-l, -i), p(-l, -l), p(-i, -l))?;
    sim.create_quadratic_bezier_curve(SegmentId(15), p(-i, l), p(-l, l), p(-l, i))?;
    // Left turns
    sim.create_quadratic_bezier_curve(SegmentId(16), p(l, i), p(l, -l), p(-i, -l))?;
    sim.create_quadratic_bezier_curve(SegmentId(17), p(i, -l), p(-l, -l), p(-l, i))?;
    sim.create_quadratic_bezier_curve(SegmentId(18), p(-l, -i), p(-l, l), p(i, l))?;
    sim.create_quadratic_bezier_curve(SegmentId(19), p(-i, l), p(l, l), p(l, -i))?;

    let entry = |interval: f64, route: [u32; 3]| GeneratorEntry {
        interval,
        template: VehicleConfig {
            route: route.into_iter().map(SegmentId).collect(),
            vel: 16.6,
            ..Default::default()
        },
    };
    sim.create_vehicle_generator(&GeneratorConfig {
        entries: vec![
            entry(1.5, [0, 8, 6]),
            entry(2.5, [1, 13, 6]),
            entry(2.0, [2, 18, 5]),
            entry(3.0, [3, 11, 5]),
        ],
        ..Default::default()
    })
}

fn main() -> Result<(), Error> {
    let mut sim = Simulation::new();
    build_intersection(&mut sim)?;

    println!("Simulating...");
    const NUM_FRAMES: u32 = 1000;
    for _ in 0..10 {
        let start = Instant::now();
        sim.run(NUM_FRAMES as usize)?;
        let frame = start.elapsed() / NUM_FRAMES;
        println!(
            "t = {:.1} s: avg. frame {:?} --> {:.0}x real time ({} vehs, {} exited)",
            sim.time(),
            frame,
            sim.time_step() / frame.as_secs_f64(),
            sim.iter_vehicles().count(),
            sim.exited_count(),
        );
    }
    Ok(())
}
