//! Read-only entity lookups used by the parallel stages.
//!
//! Stage logic is written against these traits so it runs the same over ECS
//! queries and over plain maps in tests and benchmarks.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::distance::RoadView;
use crate::curve::Bezier4;
use crate::lifecycle::Deleted;
use crate::parcel::{Parcel, ParcelTransform};
use crate::road::{
    ConnectedParcels, EdgeGeometry, EndNodeGeometry, NodeGeometry, RoadComposition, RoadCurve,
    RoadGeometry, StartNodeGeometry,
};

/// Read access to road edge data by entity.
pub trait RoadLookup {
    /// View of an eligible, live road edge. `None` if the entity is not one.
    fn road(&self, entity: Entity) -> Option<RoadView<'_>>;
}

/// Read access to parcel data by entity.
pub trait ParcelLookup {
    fn parcel(&self, entity: Entity) -> Option<(&Parcel, &ParcelTransform)>;
}

pub type RoadQueryData = (
    &'static RoadCurve,
    &'static EdgeGeometry,
    &'static StartNodeGeometry,
    &'static EndNodeGeometry,
    &'static RoadComposition,
);

pub type RoadQueryFilter = (With<ConnectedParcels>, Without<Deleted>);

pub type ParcelQueryData = (&'static Parcel, &'static ParcelTransform);

impl RoadLookup for Query<'_, '_, RoadQueryData, RoadQueryFilter> {
    fn road(&self, entity: Entity) -> Option<RoadView<'_>> {
        let (curve, edge, start, end, composition) = self.get(entity).ok()?;
        Some(RoadView {
            curve: &curve.0,
            edge,
            start: &start.0,
            end: &end.0,
            composition,
        })
    }
}

impl ParcelLookup for Query<'_, '_, ParcelQueryData> {
    fn parcel(&self, entity: Entity) -> Option<(&Parcel, &ParcelTransform)> {
        self.get(entity).ok()
    }
}

/// Owned copy of a road edge's resolver data, for lookups outside the ECS.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadRecord {
    pub curve: Bezier4,
    pub edge: EdgeGeometry,
    pub start: NodeGeometry,
    pub end: NodeGeometry,
    pub composition: RoadComposition,
}

impl RoadRecord {
    pub fn new(geometry: RoadGeometry, composition: RoadComposition) -> Self {
        Self {
            curve: geometry.curve,
            edge: geometry.edge,
            start: geometry.start_node,
            end: geometry.end_node,
            composition,
        }
    }
}

impl RoadLookup for BTreeMap<Entity, RoadRecord> {
    fn road(&self, entity: Entity) -> Option<RoadView<'_>> {
        self.get(&entity).map(|record| RoadView {
            curve: &record.curve,
            edge: &record.edge,
            start: &record.start,
            end: &record.end,
            composition: &record.composition,
        })
    }
}

impl ParcelLookup for BTreeMap<Entity, (Parcel, ParcelTransform)> {
    fn parcel(&self, entity: Entity) -> Option<(&Parcel, &ParcelTransform)> {
        self.get(&entity).map(|(parcel, transform)| (parcel, transform))
    }
}
