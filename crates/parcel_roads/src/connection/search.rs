//! Per-parcel road resolution.
//!
//! Each access point is resolved independently against the road search tree
//! plus the roads changed this cycle. Candidates are evaluated in ascending
//! entity order and a candidate only replaces the current best when it is
//! strictly closer, so equal-distance ties always go to the lowest entity.

use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

use super::distance::check_distance;
use super::lookup::{ParcelLookup, ParcelQueryData, RoadLookup, RoadQueryData, RoadQueryFilter};
use super::types::{AccessResult, RoadConnectionQueue, RoadConnectionStats, UpdateData};
use crate::curve::{side_of, xz};
use crate::parcel::{Parcel, ParcelTransform};
use crate::parcel_geometry::AccessNode;
use crate::params::ParcelRoadParams;
use crate::road::CompositionFlags;
use crate::spatial::{RoadSearchTree, SpatialIndexReader};

/// Closest eligible road to `position` within `radius`.
///
/// Candidates come from `tree` and from `updated`, the roads changed this
/// cycle that the tree may not reflect yet.
pub fn find_best_road<L: RoadLookup, R: SpatialIndexReader<Entity>>(
    lookup: &L,
    tree: &R,
    updated: &[Entity],
    position: Vec3,
    radius: f32,
    can_be_on_road: bool,
) -> Option<AccessResult> {
    let area = Rect::from_center_half_size(xz(position), Vec2::splat(radius));
    let mut candidates = Vec::new();
    tree.for_each_in(area, |_, road| candidates.push(road));
    candidates.extend_from_slice(updated);
    candidates.sort_unstable();
    candidates.dedup();

    let mut best = None;
    let mut max = radius;
    for road in candidates {
        let Some(view) = lookup.road(road) else {
            continue;
        };
        if !view.is_at_grade() {
            continue;
        }
        let mut distance = max;
        check_distance(view.edge, view.start, view.end, position, can_be_on_road, &mut distance);
        if distance >= max {
            continue;
        }
        let t = view.curve.nearest_parameter(position);
        let curve_point = view.curve.position(t);
        let side = side_of(view.curve.tangent(t), position - curve_point);
        if view.side_flags(side).intersects(CompositionFlags::BLOCKS_SIDE) {
            continue;
        }
        max = distance;
        best = Some(AccessResult {
            road,
            distance,
            curve_position: t,
            curve_point,
        });
    }
    best
}

/// Fill `item` with the best front, left and right roads for one parcel.
pub fn resolve_parcel<L: RoadLookup, R: SpatialIndexReader<Entity>>(
    lookup: &L,
    tree: &R,
    updated: &[Entity],
    params: &ParcelRoadParams,
    parcel: &Parcel,
    transform: &ParcelTransform,
    item: &mut UpdateData,
) {
    let lot = parcel.lot_size;
    item.front_access = transform.access_point(lot, AccessNode::FrontAccess);
    item.front = find_best_road(
        lookup,
        tree,
        updated,
        item.front_access,
        params.front_radius,
        true,
    );

    if params.resolve_side_access {
        let left = transform.access_point(lot, AccessNode::LeftAccess);
        let right = transform.access_point(lot, AccessNode::RightAccess);
        item.left = find_best_road(
            lookup,
            tree,
            updated,
            left,
            params.side_radius,
            params.side_can_be_on_road,
        );
        item.right = find_best_road(
            lookup,
            tree,
            updated,
            right,
            params.side_radius,
            params.side_can_be_on_road,
        );
    } else {
        item.left = None;
        item.right = None;
    }
}

/// Resolve every queued work item on the compute task pool. Each task owns a
/// disjoint chunk of items and only reads shared state.
pub fn search_road_connections(
    params: Res<ParcelRoadParams>,
    road_tree: Res<RoadSearchTree>,
    mut queue: ResMut<RoadConnectionQueue>,
    mut stats: ResMut<RoadConnectionStats>,
    roads: Query<RoadQueryData, RoadQueryFilter>,
    parcels: Query<ParcelQueryData>,
) {
    let RoadConnectionQueue {
        items,
        updated_roads,
        ..
    } = &mut *queue;
    if items.is_empty() {
        return;
    }

    let params = &*params;
    let tree = &road_tree.0;
    let updated = updated_roads.as_slice();
    let roads = &roads;
    let parcels = &parcels;
    let batch = params.search_batch_size.max(1);

    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    pool.scope(|scope| {
        for chunk in items.chunks_mut(batch) {
            scope.spawn(async move {
                for item in chunk.iter_mut() {
                    if item.deleted {
                        continue;
                    }
                    match parcels.parcel(item.parcel) {
                        Some((parcel, transform)) => {
                            resolve_parcel(roads, tree, updated, params, parcel, transform, item);
                        }
                        None => item.missing_data = true,
                    }
                }
            });
        }
    });

    let missing = items.iter().filter(|item| item.missing_data).count();
    if missing > 0 {
        trace!("road search: {missing} queued parcels had no parcel data");
        stats.skipped_missing_data += missing;
    }
}
