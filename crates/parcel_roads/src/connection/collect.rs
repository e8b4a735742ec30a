//! Change collection: decide which parcels need re-evaluation this cycle.

use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

use super::distance::{check_distance, road_distance};
use super::lookup::{ParcelLookup, ParcelQueryData, RoadLookup, RoadQueryData, RoadQueryFilter};
use super::types::{ParcelConnectionChanged, RoadConnectionQueue, RoadConnectionStats};
use crate::curve::xz;
use crate::lifecycle::{Created, Deleted, Temp, Updated};
use crate::parcel::Parcel;
use crate::parcel_geometry::AccessNode;
use crate::params::ParcelRoadParams;
use crate::road::{
    road_bounds, ConnectedParcels, EdgeGeometry, EndNodeGeometry, StartNodeGeometry,
};
use crate::spatial::{ParcelSearchTree, RoadSearchTree, SpatialIndexReader};

/// Reset the cycle's work lists and record which eligible roads changed.
pub fn begin_connection_cycle(
    mut queue: ResMut<RoadConnectionQueue>,
    mut stats: ResMut<RoadConnectionStats>,
    roads: Query<
        Entity,
        (
            With<ConnectedParcels>,
            Or<(With<Created>, With<Updated>)>,
            Without<Deleted>,
        ),
    >,
) {
    queue.clear();
    stats.begin_cycle();
    queue.updated_roads.extend(roads.iter());
    queue.updated_roads.sort_unstable();
}

/// Detach every parcel from roads deleted this cycle and enqueue it.
///
/// Runs before any other collection so later stages already see the cleared
/// road references, even when several roads are deleted at once. Parcels
/// that only reference a deleted road as a side road are found through the
/// parcel tree, around both the road's final geometry and the bounds the
/// road tree last indexed for it, and cleared too.
pub fn detach_deleted_roads(
    params: Res<ParcelRoadParams>,
    parcel_tree: Res<ParcelSearchTree>,
    road_tree: Res<RoadSearchTree>,
    mut queue: ResMut<RoadConnectionQueue>,
    mut stats: ResMut<RoadConnectionStats>,
    mut changes: EventWriter<ParcelConnectionChanged>,
    mut roads: Query<
        (
            Entity,
            &mut ConnectedParcels,
            Option<&EdgeGeometry>,
            Option<&StartNodeGeometry>,
            Option<&EndNodeGeometry>,
        ),
        With<Deleted>,
    >,
    mut parcels: Query<&mut Parcel>,
) {
    let reach = params.front_radius.max(params.side_radius);
    let mut nearby = Vec::new();

    for (road, mut connected, edge, start, end) in &mut roads {
        for parcel in connected.0.drain(..) {
            let Ok(mut data) = parcels.get_mut(parcel) else {
                stats.skipped_missing_data += 1;
                continue;
            };
            let previous = data.road_edge;
            if data.detach_road(road) && previous == Some(road) {
                stats.disconnected += 1;
                changes.send(ParcelConnectionChanged {
                    parcel,
                    previous,
                    current: None,
                    curve_position: 0.0,
                });
            }
            queue.collected.push(parcel);
        }

        let current = match (edge, start, end) {
            (Some(edge), Some(start), Some(end)) => Some(road_bounds(edge, &start.0, &end.0)),
            _ => None,
        };
        let indexed = road_tree.0.bounds_of(road);
        nearby.clear();
        for area in [current, indexed].into_iter().flatten() {
            parcel_tree
                .0
                .for_each_in(area.inflate(reach), |_, parcel| nearby.push(parcel));
        }
        nearby.sort_unstable();
        nearby.dedup();
        for &parcel in &nearby {
            let Ok(mut data) = parcels.get_mut(parcel) else {
                continue;
            };
            let references_side = data.left_road == Some(road) || data.right_road == Some(road);
            if references_side && data.detach_road(road) {
                queue.collected.push(parcel);
            }
        }
    }
}

/// Enqueue every parcel that was itself created, updated or deleted.
/// Provisional parcels are only taken while they are being created or
/// modified.
pub fn collect_updated_parcels(
    mut queue: ResMut<RoadConnectionQueue>,
    parcels: Query<
        (Entity, Option<&Temp>),
        (
            With<Parcel>,
            Or<(With<Created>, With<Updated>, With<Deleted>)>,
        ),
    >,
) {
    for (entity, temp) in &parcels {
        if temp.is_some_and(|temp| !temp.wants_evaluation()) {
            continue;
        }
        queue.collected.push(entity);
    }
}

/// Parcels near `road` whose front access would be strictly better served
/// by it than by their current road, appended to `out` in ascending order.
pub fn parcels_near_road<L, P, R>(
    roads: &L,
    parcels: &P,
    parcel_tree: &R,
    road: Entity,
    front_radius: f32,
    out: &mut Vec<Entity>,
) where
    L: RoadLookup,
    P: ParcelLookup,
    R: SpatialIndexReader<Entity>,
{
    let Some(view) = roads.road(road) else {
        return;
    };
    let area = road_bounds(view.edge, view.start, view.end).inflate(front_radius);
    let mut candidates = Vec::new();
    parcel_tree.for_each_in(area, |_, parcel| candidates.push(parcel));
    candidates.sort_unstable();
    candidates.dedup();

    for parcel in candidates {
        let Some((data, transform)) = parcels.parcel(parcel) else {
            continue;
        };
        if data.road_edge == Some(road) {
            continue;
        }
        let front = transform.access_point(data.lot_size, AccessNode::FrontAccess);
        if !area.contains(xz(front)) {
            continue;
        }
        let Some(distance) = road_distance(&view, front, front_radius, true) else {
            continue;
        };
        let Some(current) = data.road_edge else {
            out.push(parcel);
            continue;
        };
        let mut current_distance = front_radius;
        if let Some(current_view) = roads.road(current) {
            check_distance(
                current_view.edge,
                current_view.start,
                current_view.end,
                front,
                true,
                &mut current_distance,
            );
        }
        if distance < current_distance {
            out.push(parcel);
        }
    }
}

/// Parcels near `road` whose left or right access would be strictly better
/// served by it than by the side road they hold now, appended to `out` in
/// ascending order. Collects nothing when side access is not resolved.
pub fn parcels_beside_road<L, P, R>(
    roads: &L,
    parcels: &P,
    parcel_tree: &R,
    road: Entity,
    params: &ParcelRoadParams,
    out: &mut Vec<Entity>,
) where
    L: RoadLookup,
    P: ParcelLookup,
    R: SpatialIndexReader<Entity>,
{
    if !params.resolve_side_access {
        return;
    }
    let Some(view) = roads.road(road) else {
        return;
    };
    let radius = params.side_radius;
    let on_road = params.side_can_be_on_road;
    let area = road_bounds(view.edge, view.start, view.end).inflate(radius);
    let mut candidates = Vec::new();
    parcel_tree.for_each_in(area, |_, parcel| candidates.push(parcel));
    candidates.sort_unstable();
    candidates.dedup();

    for parcel in candidates {
        let Some((data, transform)) = parcels.parcel(parcel) else {
            continue;
        };
        let sides = [
            (AccessNode::LeftAccess, data.left_road),
            (AccessNode::RightAccess, data.right_road),
        ];
        let better = sides.into_iter().any(|(node, current)| {
            if current == Some(road) {
                return false;
            }
            let point = transform.access_point(data.lot_size, node);
            let Some(distance) = road_distance(&view, point, radius, on_road) else {
                return false;
            };
            let mut current_distance = radius;
            if let Some(current_view) = current.and_then(|current| roads.road(current)) {
                check_distance(
                    current_view.edge,
                    current_view.start,
                    current_view.end,
                    point,
                    on_road,
                    &mut current_distance,
                );
            }
            distance < current_distance
        });
        if better {
            out.push(parcel);
        }
    }
}

/// Parcels inside `area` holding `road` as their left or right road,
/// appended to `out` in ascending order.
pub fn parcels_with_side_road<P, R>(
    parcels: &P,
    parcel_tree: &R,
    road: Entity,
    area: Rect,
    out: &mut Vec<Entity>,
) where
    P: ParcelLookup,
    R: SpatialIndexReader<Entity>,
{
    let mut candidates = Vec::new();
    parcel_tree.for_each_in(area, |_, parcel| candidates.push(parcel));
    candidates.sort_unstable();
    candidates.dedup();
    for parcel in candidates {
        let Some((data, _)) = parcels.parcel(parcel) else {
            continue;
        };
        if data.left_road == Some(road) || data.right_road == Some(road) {
            out.push(parcel);
        }
    }
}

/// Enqueue parcels that an updated road may now serve better, plus every
/// parcel already attached to it, whose distance may have grown. Front
/// attachments come from the road's buffer; side attachments are looked up
/// around the bounds the road tree still holds from the previous cycle.
/// Updated roads are split into chunks handled on the compute task pool.
pub fn collect_parcels_near_updated_roads(
    params: Res<ParcelRoadParams>,
    parcel_tree: Res<ParcelSearchTree>,
    road_tree: Res<RoadSearchTree>,
    mut queue: ResMut<RoadConnectionQueue>,
    roads: Query<RoadQueryData, RoadQueryFilter>,
    parcels: Query<ParcelQueryData>,
    buffers: Query<&ConnectedParcels, Without<Deleted>>,
) {
    if queue.updated_roads.is_empty() {
        return;
    }

    let queue = &mut *queue;
    for &road in &queue.updated_roads {
        if let Ok(connected) = buffers.get(road) {
            queue.collected.extend_from_slice(&connected.0);
        }
    }

    let params = &*params;
    let radius = params.front_radius;
    let reach = params.front_radius.max(params.side_radius);
    let batch = params.search_batch_size.max(1);
    let tree = &parcel_tree.0;
    let indexed = &road_tree.0;
    let roads = &roads;
    let parcels = &parcels;

    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    let found = pool.scope(|scope| {
        for chunk in queue.updated_roads.chunks(batch) {
            scope.spawn(async move {
                let mut out = Vec::new();
                for &road in chunk {
                    parcels_near_road(roads, parcels, tree, road, radius, &mut out);
                    parcels_beside_road(roads, parcels, tree, road, params, &mut out);
                    if let Some(previous) = indexed.bounds_of(road) {
                        let area = previous.inflate(reach);
                        parcels_with_side_road(parcels, tree, road, area, &mut out);
                    }
                }
                out
            });
        }
    });

    for near in found {
        queue.collected.extend(near);
    }
}
