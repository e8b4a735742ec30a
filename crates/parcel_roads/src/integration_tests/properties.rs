use bevy::prelude::*;

use super::{road_at_distance, LOT_2X3};
use crate::road::{CompositionFlags, RoadComposition};
use crate::test_harness::TestWorld;

// ====================================================================
// Resolver-wide properties
// ====================================================================

fn build_block(world: &mut TestWorld) -> Vec<Entity> {
    let mut parcels = Vec::new();
    for i in 0..6 {
        let x = i as f32 * 18.0 - 45.0;
        parcels.push(world.spawn_parcel(LOT_2X3, Vec3::new(x, 0.0, 0.0)));
    }
    for distance in [2.0, 5.0] {
        let z = 16.0 + distance;
        world.spawn_road(Vec2::new(-60.0, z), Vec2::new(60.0, z));
    }
    world.spawn_road(Vec2::new(-60.0, -40.0), Vec2::new(-60.0, 40.0));
    parcels
}

#[test]
fn test_identical_inputs_give_identical_results() {
    let mut first = TestWorld::new();
    let mut second = TestWorld::new();
    build_block(&mut first);
    build_block(&mut second);
    first.tick(2);
    second.tick(2);

    assert_eq!(first.parcels(), second.parcels());
    assert_eq!(first.road_buffers(), second.road_buffers());
    assert_eq!(first.state_hash(), second.state_hash());
}

#[test]
fn test_closest_road_wins_with_fallback_chain() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let roads: Vec<Entity> = [6.0, 2.0, 4.0]
        .into_iter()
        .map(|distance| {
            let (from, to) = road_at_distance(distance);
            world.spawn_road(from, to)
        })
        .collect();
    let (far, nearest, middle) = (roads[0], roads[1], roads[2]);
    world.tick(1);
    world.assert_connected_to(parcel, nearest);

    world.delete(nearest);
    world.tick(1);
    world.assert_connected_to(parcel, middle);

    world.delete(middle);
    world.tick(1);
    world.assert_connected_to(parcel, far);

    world.delete(far);
    world.tick(1);
    world.assert_disconnected(parcel);
    world.assert_consistent();
}

#[test]
fn test_elevated_and_tunnel_roads_are_never_assigned() {
    for general in [CompositionFlags::ELEVATED, CompositionFlags::TUNNEL] {
        let mut world = TestWorld::new();
        let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
        let (from, to) = road_at_distance(1.0);
        world.spawn_road_with(
            from,
            to,
            RoadComposition {
                general,
                ..Default::default()
            },
        );
        world.tick(1);
        world.assert_disconnected(parcel);
    }
}

#[test]
fn test_elevated_road_is_skipped_for_farther_at_grade_road() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(1.0);
    world.spawn_elevated_road(from, to);
    let (from, to) = road_at_distance(6.0);
    let at_grade = world.spawn_road(from, to);
    world.tick(1);
    world.assert_connected_to(parcel, at_grade);
}

#[test]
fn test_raised_side_is_never_assigned_from_that_side() {
    // The road runs along +X in front of the parcel, so the parcel sits on
    // its right (-Z) side.
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(2.0);
    let raised_right = world.spawn_road_with(
        from,
        to,
        RoadComposition {
            right: CompositionFlags::RAISED,
            ..Default::default()
        },
    );
    world.tick(1);
    world.assert_disconnected(parcel);

    world.set_road_composition(
        raised_right,
        RoadComposition {
            left: CompositionFlags::RAISED,
            ..Default::default()
        },
    );
    world.tick(1);
    world.assert_connected_to(parcel, raised_right);
}

#[test]
fn test_cycle_without_changes_is_idempotent() {
    let mut world = TestWorld::new();
    build_block(&mut world);
    world.tick(2);
    let parcels = world.parcels();
    let buffers = world.road_buffers();
    let icons = world.icons().clone();
    let hash = world.state_hash();

    world.tick(3);

    assert_eq!(world.parcels(), parcels);
    assert_eq!(world.road_buffers(), buffers);
    assert_eq!(world.icons(), &icons);
    assert_eq!(world.state_hash(), hash);
    assert_eq!(world.stats().unique, 0);
}

#[test]
fn test_reverse_index_holds_after_edits() {
    let mut world = TestWorld::new();
    let parcels = build_block(&mut world);
    world.tick(1);
    world.assert_consistent();

    let roads: Vec<Entity> = world.road_buffers().into_iter().map(|(road, _)| road).collect();
    world.delete(roads[0]);
    world.delete(parcels[2]);
    world.tick(1);
    world.assert_consistent();

    world.move_road(roads[1], Vec2::new(-60.0, 100.0), Vec2::new(60.0, 100.0));
    world.tick(1);
    world.assert_consistent();
}

#[test]
fn test_parcel_enqueued_many_times_is_processed_once() {
    let mut world = TestWorld::new();
    let parcel = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    world.tick(1);

    world.touch(parcel);
    let (from, to) = road_at_distance(3.0);
    let near = world.spawn_road(from, to);
    let (from, to) = road_at_distance(5.0);
    world.spawn_road(from, to);
    world.tick(1);

    let stats = world.stats();
    assert_eq!(stats.queued, 3);
    assert_eq!(stats.unique, 1);
    assert_eq!(stats.connected, 1);
    world.assert_connected_to(parcel, near);
}

#[test]
fn test_deleted_parcel_loses_icon_and_buffer_entry() {
    let mut world = TestWorld::new();
    let lonely = world.spawn_parcel(LOT_2X3, Vec3::new(500.0, 0.0, 0.0));
    let connected = world.spawn_parcel(LOT_2X3, Vec3::ZERO);
    let (from, to) = road_at_distance(5.0);
    let road = world.spawn_road(from, to);
    world.tick(1);
    assert!(world.has_no_road_icon(lonely));

    world.delete(lonely);
    world.delete(connected);
    world.tick(1);

    assert!(world.icons().is_empty());
    assert!(world.connected_parcels(road).is_empty());
    assert!(!world.exists(lonely));
    assert!(!world.parcel_tree().0.contains(connected));
}
