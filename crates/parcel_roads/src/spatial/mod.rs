//! Spatial indexes over road edges and parcels.
//!
//! Readers go through [`SpatialIndexReader`], a visitor-based query: the
//! visitor prunes subtrees with `intersect` and receives every item whose
//! bounds it accepts. The two search trees are resources written only by the
//! systems in [`ParcelRoadSet::Index`](crate::ParcelRoadSet::Index), which run
//! after every stage that reads them. Within a cycle the resolver therefore
//! sees the index as it stood at the end of the previous cycle, and catches
//! up on this cycle's road changes through the updated-roads list.

mod quadtree;

pub use quadtree::QuadTree;

use bevy::prelude::*;

use crate::lifecycle::{Created, Deleted, Updated};
use crate::parcel::{Parcel, ParcelTransform};
use crate::road::{road_bounds, ConnectedParcels, EdgeGeometry, EndNodeGeometry, StartNodeGeometry};
use crate::ParcelRoadSet;

/// Callback interface for [`SpatialIndexReader::iterate`].
pub trait SpatialVisitor<T> {
    /// Whether the subtree or item with these bounds may be relevant.
    fn intersect(&mut self, bounds: &Rect) -> bool;
    /// Called for each item whose bounds passed `intersect`.
    fn visit(&mut self, bounds: &Rect, item: T);
}

/// Read-only access to a bounds-indexed collection.
pub trait SpatialIndexReader<T> {
    fn iterate<V: SpatialVisitor<T>>(&self, visitor: &mut V);

    /// Call `f` for every item whose bounds overlap `area`.
    fn for_each_in<F: FnMut(&Rect, T)>(&self, area: Rect, f: F) {
        let mut visitor = AreaVisitor { area, f };
        self.iterate(&mut visitor);
    }
}

struct AreaVisitor<F> {
    area: Rect,
    f: F,
}

impl<T, F: FnMut(&Rect, T)> SpatialVisitor<T> for AreaVisitor<F> {
    fn intersect(&mut self, bounds: &Rect) -> bool {
        rects_overlap(*bounds, self.area)
    }

    fn visit(&mut self, bounds: &Rect, item: T) {
        (self.f)(bounds, item);
    }
}

/// Whether two rectangles overlap, edges inclusive.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
}

/// Road edges that parcels may connect to, keyed by their combined edge and
/// node bounds.
#[derive(Resource, Debug, Default)]
pub struct RoadSearchTree(pub QuadTree<Entity>);

/// Parcels keyed by their footprint bounds.
#[derive(Resource, Debug, Default)]
pub struct ParcelSearchTree(pub QuadTree<Entity>);

type ChangedFilter = Or<(With<Created>, With<Updated>, With<Deleted>)>;

/// Mirror this cycle's road edge changes into [`RoadSearchTree`].
pub fn update_road_search_tree(
    mut tree: ResMut<RoadSearchTree>,
    roads: Query<
        (
            Entity,
            Option<&EdgeGeometry>,
            Option<&StartNodeGeometry>,
            Option<&EndNodeGeometry>,
            Has<Deleted>,
        ),
        (With<ConnectedParcels>, ChangedFilter),
    >,
) {
    for (entity, edge, start, end, deleted) in &roads {
        match (edge, start, end, deleted) {
            (Some(edge), Some(start), Some(end), false) => {
                tree.0.update(entity, road_bounds(edge, &start.0, &end.0));
            }
            _ => {
                tree.0.remove(entity);
            }
        }
    }
}

/// Mirror this cycle's parcel changes into [`ParcelSearchTree`].
pub fn update_parcel_search_tree(
    mut tree: ResMut<ParcelSearchTree>,
    parcels: Query<(Entity, &Parcel, &ParcelTransform, Has<Deleted>), ChangedFilter>,
) {
    for (entity, parcel, transform, deleted) in &parcels {
        if deleted {
            tree.0.remove(entity);
        } else {
            tree.0.update(entity, transform.bounds_xz(parcel.lot_size));
        }
    }
}

pub struct SearchTreePlugin;

impl Plugin for SearchTreePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadSearchTree>()
            .init_resource::<ParcelSearchTree>()
            .add_systems(
                FixedUpdate,
                (update_road_search_tree, update_parcel_search_tree).in_set(ParcelRoadSet::Index),
            );
    }
}
