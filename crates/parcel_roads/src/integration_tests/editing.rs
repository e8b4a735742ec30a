use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use super::{road_at_distance, LOT_2X3};
use crate::icons::WarningIconKind;
use crate::parcel::{ParcelFlags, ParcelTransform};
use crate::params::ParcelRoadParams;
use crate::road::{CompositionFlags, RoadComposition};
use crate::test_harness::TestWorld;

// ====================================================================
// Parcel edits
// ====================================================================

#[test]
fn test_moving_parcel_out_of_reach_disconnects_it() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, road);

    world.move_parcel(parcel, ParcelTransform::from_position(Vec3::new(200.0, 0.0, 0.0)));
    world.tick(1);

    world.assert_disconnected(parcel);
    assert!(world.connected_parcels(road).is_empty());
    let anchor = world.icons().get(parcel, WarningIconKind::NoRoadAccess);
    assert_eq!(anchor, Some(Vec3::new(200.0, 0.0, 12.0)));
    world.assert_consistent();
}

#[test]
fn test_sliding_parcel_along_road_updates_curve_position() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);
    let before = world.curve_position(parcel);

    world.move_parcel(parcel, ParcelTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    world.tick(1);

    world.assert_connected_to(parcel, road);
    assert!(world.curve_position(parcel) > before);
    assert!((world.curve_position(parcel) - 0.75).abs() < 1e-2);
    assert_eq!(world.stats().curve_updates, 1);
}

#[test]
fn test_rotated_parcel_uses_rotated_front_access() {
    let mut world = TestWorld::new();
    // A quarter turn about +Y points the front at +X.
    let transform = ParcelTransform::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
    let parcel = world.spawn_parcel_with(LOT_2X3, transform);
    // Road along Z whose near boundary is 3 units past x = 12.
    let road = world.spawn_road(Vec2::new(19.0, -20.0), Vec2::new(19.0, 20.0));
    world.tick(1);
    world.assert_connected_to(parcel, road);
}

#[test]
fn test_provisional_parcel_has_no_side_effects() {
    let mut world = TestWorld::new();
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    let preview = world.spawn_temp_parcel(LOT_2X3, Vec3::ZERO);
    let lonely = world.spawn_temp_parcel(LOT_2X3, Vec3::new(300.0, 0.0, 0.0));
    world.tick(1);

    assert_eq!(world.front_road(preview), Some(road));
    assert!(world.connected_parcels(road).is_empty());
    assert!(!world.has_no_road_icon(lonely));
    assert!(world.drain_connection_changes().is_empty());
    world.assert_consistent();
}

// ====================================================================
// Road edits
// ====================================================================

#[test]
fn test_moving_road_away_releases_its_parcels() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, road);

    world.move_road(road, Vec2::new(-20.0, 200.0), Vec2::new(20.0, 200.0));
    world.tick(1);

    world.assert_disconnected(parcel);
    assert!(world.connected_parcels(road).is_empty());
    world.assert_consistent();
}

#[test]
fn test_elevating_road_releases_its_parcels() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(2.0);
    let bridge = world.spawn_road(from, to);
    let (from, to) = road_at_distance(7.0);
    let street = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, bridge);

    world.set_road_composition(
        bridge,
        RoadComposition {
            general: CompositionFlags::ELEVATED,
            ..Default::default()
        },
    );
    world.tick(1);
    world.assert_connected_to(parcel, street);
}

#[test]
fn test_moving_road_closer_captures_parcel() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let road = world.spawn_road(Vec2::new(-20.0, 100.0), Vec2::new(20.0, 100.0));
    world.tick(1);
    world.assert_disconnected(parcel);

    let (from, to) = road_at_distance(4.0);
    world.move_road(road, from, to);
    world.tick(1);
    world.assert_connected_to(parcel, road);
}

// ====================================================================
// Side access
// ====================================================================

/// A 2x2 parcel at the origin with a road along Z two units past its left
/// access point (x = 8).
fn side_road_world(params: ParcelRoadParams) -> (TestWorld, Entity, Entity) {
    let mut world = TestWorld::with_params(params);
    let parcel = world.spawn_parcel(UVec2::new(2, 2), Vec3::ZERO);
    let road = world.spawn_road(Vec2::new(14.0, -30.0), Vec2::new(14.0, 30.0));
    world.tick(1);
    (world, parcel, road)
}

#[test]
fn test_side_road_sets_left_flag_without_front_road() {
    let (world, parcel, road) = side_road_world(ParcelRoadParams::default());
    assert_eq!(world.left_road(parcel), Some(road));
    assert_eq!(world.right_road(parcel), None);
    assert_eq!(world.front_road(parcel), None);
    assert_eq!(world.parcel_flags(parcel), ParcelFlags::ROAD_LEFT);
    // Side roads do not list the parcel and do not clear the icon.
    assert!(world.connected_parcels(road).is_empty());
    assert!(world.has_no_road_icon(parcel));
}

#[test]
fn test_side_access_can_be_disabled() {
    let params = ParcelRoadParams {
        resolve_side_access: false,
        ..Default::default()
    };
    let (world, parcel, _) = side_road_world(params);
    assert_eq!(world.left_road(parcel), None);
    assert_eq!(world.parcel_flags(parcel), ParcelFlags::empty());
}

#[test]
fn test_deleting_side_road_clears_side_reference() {
    let (mut world, parcel, road) = side_road_world(ParcelRoadParams::default());
    world.delete(road);
    world.tick(1);
    assert_eq!(world.left_road(parcel), None);
    assert_eq!(world.parcel_flags(parcel), ParcelFlags::empty());
    world.assert_consistent();
}

#[test]
fn test_moving_side_road_away_clears_side_reference() {
    let (mut world, parcel, road) = side_road_world(ParcelRoadParams::default());
    assert_eq!(world.left_road(parcel), Some(road));

    world.move_road(road, Vec2::new(500.0, -30.0), Vec2::new(500.0, 30.0));
    world.tick(1);

    assert_eq!(world.left_road(parcel), None);
    assert_eq!(world.parcel_flags(parcel), ParcelFlags::empty());
    world.assert_consistent();
}

#[test]
fn test_new_road_beside_parcel_becomes_side_road() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(UVec2::new(2, 2), Vec3::ZERO);
    world.tick(1);
    assert_eq!(world.left_road(parcel), None);

    let road = world.spawn_road(Vec2::new(14.0, -30.0), Vec2::new(14.0, 30.0));
    world.tick(1);

    assert_eq!(world.left_road(parcel), Some(road));
    assert_eq!(world.parcel_flags(parcel), ParcelFlags::ROAD_LEFT);
    world.assert_consistent();
}

#[test]
fn test_side_road_moved_and_deleted_in_one_cycle_is_cleared() {
    let (mut world, parcel, road) = side_road_world(ParcelRoadParams::default());
    world.move_road(road, Vec2::new(500.0, -30.0), Vec2::new(500.0, 30.0));
    world.delete(road);
    world.tick(1);

    assert!(!world.exists(road));
    assert_eq!(world.left_road(parcel), None);
    world.assert_consistent();
}

#[test]
fn test_closer_side_road_replaces_farther_one() {
    let (mut world, parcel, far) = side_road_world(ParcelRoadParams::default());
    let near = world.spawn_road(Vec2::new(13.0, -30.0), Vec2::new(13.0, 30.0));
    world.tick(1);

    assert_ne!(near, far);
    assert_eq!(world.left_road(parcel), Some(near));
    world.assert_consistent();
}

#[test]
fn test_raising_side_road_edge_releases_side_reference() {
    let (mut world, parcel, road) = side_road_world(ParcelRoadParams::default());
    // The parcel sits on the road's left side (-X of a road heading +Z).
    world.set_road_composition(
        road,
        RoadComposition {
            left: CompositionFlags::RAISED,
            ..Default::default()
        },
    );
    world.tick(1);

    assert_eq!(world.left_road(parcel), None);
    world.assert_consistent();
}

#[test]
fn test_params_loaded_from_json_drive_the_search_radius() {
    let params = ParcelRoadParams::from_json_str(r#"{ "front_radius": 2.0 }"#)
        .expect("valid params");
    let mut world = TestWorld::with_params(params);
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    world.spawn_road(from, to);
    world.tick(1);
    world.assert_disconnected(parcel);
}
