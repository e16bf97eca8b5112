//! Grid → map projection.

use taxi_playback_core::{
    config::{MapperConfig, PlaybackConfig},
    controller::PlaybackController,
    mapper::{CoordinateMapper, GeoPosition},
    result::{PathEntity, Position, SimulationResult},
};

const EPS: f64 = 1e-9;

fn close(a: GeoPosition, b: GeoPosition) -> bool {
    (a.lat - b.lat).abs() < EPS && (a.lng - b.lng).abs() < EPS
}

#[test]
fn origin_maps_to_base_coordinates() {
    let mapper = CoordinateMapper::default();
    let geo = mapper.project(Position::new(0.0, 0.0), 0.0);
    assert_eq!(geo, GeoPosition { lat: 17.385, lng: 78.4867 });
}

#[test]
fn projection_is_pure() {
    let mapper = CoordinateMapper::default();
    let p = Position::new(3.0, 4.0);
    let first = mapper.project(p, 0.004);
    for _ in 0..10 {
        assert_eq!(mapper.project(p, 0.004), first);
    }
}

#[test]
fn projection_is_affine_in_row_col_and_offset() {
    let mapper = CoordinateMapper::new(MapperConfig {
        base_lat:           10.0,
        base_lng:           20.0,
        cell_size:          0.5,
        entity_offset_step: 0.1,
    });

    let base = mapper.project(Position::new(1.0, 1.0), 0.0);
    let down = mapper.project(Position::new(2.0, 1.0), 0.0);
    let right = mapper.project(Position::new(1.0, 2.0), 0.0);
    let shifted = mapper.project(Position::new(1.0, 1.0), 0.3);

    assert!(close(down, GeoPosition { lat: base.lat + 0.5, lng: base.lng }));
    assert!(close(right, GeoPosition { lat: base.lat, lng: base.lng + 0.5 }));
    assert!(close(shifted, GeoPosition { lat: base.lat + 0.3, lng: base.lng + 0.3 }));
}

#[test]
fn entity_offset_grows_with_index() {
    let mapper = CoordinateMapper::default();
    assert_eq!(mapper.entity_offset(0), 0.0);
    assert!((mapper.entity_offset(3) - 0.006).abs() < EPS);
}

#[test]
fn geo_frame_separates_taxis_on_the_same_cell() {
    let path = vec![Position::new(2.0, 2.0), Position::new(2.0, 3.0)];
    let mut a = PathEntity::new(1, path.clone());
    a.pickup = Some(Position::new(0.0, 0.0));
    a.dropoff = Some(Position::new(4.0, 3.0));
    let b = PathEntity::new(2, path);

    let mut controller = PlaybackController::manual(PlaybackConfig::default());
    controller.load(SimulationResult::new(vec![a, b])).unwrap();
    let mapper = CoordinateMapper::new(controller.config().mapper.clone());
    let frame = controller.current_geo_frame(&mapper).unwrap();

    let (ga, gb) = (&frame.entities[0], &frame.entities[1]);
    assert!(close(ga.position, mapper.project(Position::new(2.0, 2.0), 0.0)));
    assert!(close(gb.position, mapper.project(Position::new(2.0, 2.0), 0.002)));
    assert_ne!(ga.position, gb.position);

    assert_eq!(ga.geometry.route.len(), 2);
    assert_eq!(ga.geometry.route[0], ga.position);
    assert_eq!(ga.geometry.pickup, Some(mapper.project(Position::new(0.0, 0.0), 0.0)));
    assert_eq!(ga.geometry.dropoff, Some(mapper.project(Position::new(4.0, 3.0), 0.0)));
    assert_eq!(gb.geometry.pickup, None);
}
