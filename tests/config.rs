//! Tests of scenario configuration authored as JSON.
#![cfg(feature = "serde")]

use traffic_flow::{
    math::Point2d, Arrivals, GeneratorConfig, SegmentGeometry, SegmentId, SimulationConfig,
    VehicleConfig,
};

#[test]
fn vehicle_config_defaults() {
    let config: VehicleConfig =
        serde_json::from_str(r#"{ "route": [0, 8, 6], "vel": 16.6 }"#).unwrap();
    assert_eq!(
        config,
        VehicleConfig {
            route: vec![SegmentId(0), SegmentId(8), SegmentId(6)],
            vel: 16.6,
            ..Default::default()
        }
    );
}

#[test]
fn generator_config() {
    let config: GeneratorConfig = serde_json::from_str(
        r#"{
            "entries": [
                { "interval": 1.0, "template": { "route": [0, 12, 5], "vel": 16.6 } },
                { "interval": 2.5, "template": { "route": [2], "desired_velocity": 12.0 } }
            ],
            "arrivals": "Poisson",
            "seed": 7
        }"#,
    )
    .unwrap();
    assert_eq!(config.entries.len(), 2);
    assert_eq!(config.entries[1].template.desired_velocity, 12.0);
    assert_eq!(config.arrivals, Arrivals::Poisson);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn segment_geometry() {
    let geometry: SegmentGeometry = serde_json::from_str(
        r#"{ "QuadraticCurve": { "start": { "x": 0.0, "y": 0.0 }, "control": { "x": 10.0, "y": 0.0 }, "end": { "x": 10.0, "y": 10.0 } } }"#,
    )
    .unwrap();
    assert_eq!(
        geometry,
        SegmentGeometry::QuadraticCurve {
            start: Point2d::new(0.0, 0.0),
            control: Point2d::new(10.0, 0.0),
            end: Point2d::new(10.0, 10.0),
        }
    );
}

#[test]
fn simulation_config_defaults() {
    let config: SimulationConfig = serde_json::from_str(r#"{ "resolution": 100 }"#).unwrap();
    assert_eq!(config.resolution, 100);
    assert_eq!(config.time_step, 1.0 / 60.0);
}
