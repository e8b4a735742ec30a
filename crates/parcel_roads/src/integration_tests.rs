//! Integration tests for the parcel road resolver using the `TestWorld`
//! harness.
//!
//! These tests spin up a headless Bevy App with `ParcelRoadsPlugin` and
//! verify whole resolver cycles: collection, search, commit, index upkeep
//! and marker cleanup working together.

mod editing;
mod properties;

use bevy::prelude::*;

use crate::icons::WarningIconKind;
use crate::test_harness::TestWorld;

/// 2x3 lot: 16 x 24 world units, front access 12 units in front of centre.
const LOT_2X3: UVec2 = UVec2::new(2, 3);

/// X-Z endpoints of a road running along X, 40 units long, whose near
/// boundary lies `distance` units beyond the front access of a 2x3 parcel at
/// the origin.
fn road_at_distance(distance: f32) -> (Vec2, Vec2) {
    let z = 12.0 + distance + 4.0;
    (Vec2::new(-20.0, z), Vec2::new(20.0, z))
}

// ===========================================================================
// 1. Harness bootstrap tests
// ===========================================================================

#[test]
fn empty_world_has_no_connections() {
    let mut world = TestWorld::new();
    world.tick(1);
    assert!(world.parcels().is_empty());
    assert!(world.icons().is_empty());
    assert!(world.road_tree().0.is_empty());
    assert!(world.stats().cycles >= 1);
}

#[test]
fn spawned_entities_are_indexed_after_one_tick() {
    let mut world = TestWorld::new();
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    world.tick(1);
    assert!(world.road_tree().0.contains(road));
    assert!(world.parcel_tree().0.contains(parcel));
}

// ===========================================================================
// 2. Concrete scenarios
// ===========================================================================

#[test]
fn lone_parcel_gets_icon_at_front_access() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    world.tick(1);

    world.assert_disconnected(parcel);
    let anchor = world
        .icons()
        .get(parcel, WarningIconKind::NoRoadAccess)
        .expect("icon raised");
    assert!((anchor - Vec3::new(0.0, 0.0, 12.0)).length() < 1e-4, "{anchor:?}");
}

#[test]
fn road_five_units_away_connects_and_clears_icon() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    world.tick(1);
    assert!(world.has_no_road_icon(parcel));

    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);

    world.assert_connected_to(parcel, road);
    assert!((world.curve_position(parcel) - 0.5).abs() < 1e-2);
    assert_eq!(world.stats().connected, 1);

    let changes = world.drain_connection_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].parcel, parcel);
    assert_eq!(changes[0].previous, None);
    assert_eq!(changes[0].current, Some(road));
}

#[test]
fn parcel_and_road_created_in_same_cycle_connect() {
    let mut world = TestWorld::new();
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    world.tick(1);
    world.assert_connected_to(parcel, road);
}

#[test]
fn closer_road_takes_over_parcel() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(6.0);
    let road_a = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, road_a);

    let (from, to) = road_at_distance(3.0);
    let road_b = world.spawn_road(from, to);
    world.tick(1);

    world.assert_connected_to(parcel, road_b);
    assert!(world.connected_parcels(road_a).is_empty());
    assert_eq!(world.connected_parcels(road_b), vec![parcel]);
    assert_eq!(world.stats().reassigned, 1);
}

#[test]
fn deleting_only_road_disconnects_parcel() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, road);
    world.drain_connection_changes();

    world.delete(road);
    world.tick(1);

    world.assert_disconnected(parcel);
    assert!(!world.exists(road));
    assert!(!world.road_tree().0.contains(road));
    let changes = world.drain_connection_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].previous, Some(road));
    assert_eq!(changes[0].current, None);
    world.assert_consistent();
}

#[test]
fn two_parcels_on_one_new_road_are_both_processed() {
    let mut world = TestWorld::new();
    let left = world.spawn_parcel(LOT_2X3, Vec3::new(-10.0, 0.0, 0.0));
    let right = world.spawn_parcel(LOT_2X3, Vec3::new(10.0, 0.0, 0.0));
    world.tick(1);

    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);

    assert_eq!(world.stats().unique, 2);
    world.assert_connected_to(left, road);
    world.assert_connected_to(right, road);
    let mut buffer = world.connected_parcels(road);
    buffer.sort_unstable();
    let mut expected = vec![left, right];
    expected.sort_unstable();
    assert_eq!(buffer, expected);
    assert!(world.curve_position(left) < world.curve_position(right));
}
