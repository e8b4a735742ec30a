//! Assertion helpers for `TestWorld` integration tests.

use bevy::prelude::*;

use crate::connection::{road_distance, RoadView};
use crate::lifecycle::Deleted;
use crate::parcel::{ParcelFlags, ParcelTransform};
use crate::parcel_geometry::AccessNode;
use crate::params::ParcelRoadParams;
use crate::road::{
    ConnectedParcels, EdgeGeometry, EndNodeGeometry, RoadComposition, RoadCurve,
    StartNodeGeometry,
};

use super::TestWorld;

impl TestWorld {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert the parcel's front road, and that it is listed on that road.
    pub fn assert_front_road(&self, parcel: Entity, expected: Option<Entity>) {
        let actual = self.front_road(parcel);
        assert_eq!(
            actual, expected,
            "Expected front road {expected:?} for {parcel}, got {actual:?}"
        );
        if let Some(road) = expected {
            assert!(
                self.connected_parcels(road).contains(&parcel),
                "Expected {parcel} in the buffer of {road}, found {:?}",
                self.connected_parcels(road)
            );
        }
    }

    /// Assert a parcel has no front road and shows the no-road icon.
    pub fn assert_disconnected(&self, parcel: Entity) {
        self.assert_front_road(parcel, None);
        assert!(
            self.has_no_road_icon(parcel),
            "Expected a no-road icon on {parcel}"
        );
        assert!(
            !self.parcel_flags(parcel).contains(ParcelFlags::ROAD_FRONT),
            "Expected ROAD_FRONT cleared on {parcel}"
        );
    }

    /// Assert a parcel is on `road` and shows no icon.
    pub fn assert_connected_to(&self, parcel: Entity, road: Entity) {
        self.assert_front_road(parcel, Some(road));
        assert!(
            !self.has_no_road_icon(parcel),
            "Expected no icon on connected parcel {parcel}"
        );
        assert!(
            self.parcel_flags(parcel).contains(ParcelFlags::ROAD_FRONT),
            "Expected ROAD_FRONT set on {parcel}"
        );
    }

    /// Assert the buffer/reference invariants over the whole world:
    ///
    /// * every parcel with a front road appears exactly once in that road's
    ///   buffer, and in no other buffer
    /// * every buffer entry is a live parcel referencing that road
    /// * flags match the road references
    /// * side roads are live, eligible edges within the side radius of the
    ///   matching access point
    /// * non-provisional parcels show the no-road icon iff they have no road
    pub fn assert_consistent(&mut self) {
        let parcels = self.parcels();
        let buffers = self.road_buffers();
        let world = self.app.world();

        for (parcel, data) in &parcels {
            let listed: Vec<Entity> = buffers
                .iter()
                .filter(|(_, buffer)| buffer.contains(parcel))
                .map(|(road, _)| *road)
                .collect();
            let is_temp = world.get::<crate::lifecycle::Temp>(*parcel).is_some();
            if is_temp {
                assert!(listed.is_empty(), "Provisional {parcel} listed on {listed:?}");
                continue;
            }
            match data.road_edge {
                Some(road) => {
                    assert_eq!(listed, vec![road], "{parcel} buffer membership");
                    let count = buffers
                        .iter()
                        .find(|(r, _)| *r == road)
                        .map_or(0, |(_, b)| b.iter().filter(|p| *p == parcel).count());
                    assert_eq!(count, 1, "{parcel} listed {count} times on {road}");
                }
                None => assert!(listed.is_empty(), "Unconnected {parcel} listed on {listed:?}"),
            }
            assert_eq!(data.flags, data.derived_flags(), "{parcel} flags");
            self.assert_side_road(*parcel, AccessNode::LeftAccess, data.left_road);
            self.assert_side_road(*parcel, AccessNode::RightAccess, data.right_road);
            assert_eq!(
                self.has_no_road_icon(*parcel),
                data.road_edge.is_none(),
                "{parcel} icon state"
            );
        }

        for (road, buffer) in &buffers {
            for parcel in buffer {
                let entry = parcels.iter().find(|(p, _)| p == parcel);
                assert!(
                    entry.is_some_and(|(_, data)| data.road_edge == Some(*road)),
                    "{road} lists {parcel}, which does not reference it"
                );
            }
        }
    }

    /// Assert that `road`, if any, is a live edge that may take connections
    /// and lies within the side radius of the parcel's `node` access point.
    fn assert_side_road(&self, parcel: Entity, node: AccessNode, road: Option<Entity>) {
        let Some(road) = road else {
            return;
        };
        let world = self.app.world();
        let Ok(entity) = world.get_entity(road) else {
            panic!("{parcel} {node:?} road {road} was despawned");
        };
        assert!(
            entity.contains::<ConnectedParcels>() && !entity.contains::<Deleted>(),
            "{parcel} {node:?} road {road} is not a live road edge"
        );
        let (Some(curve), Some(edge), Some(start), Some(end), Some(composition)) = (
            entity.get::<RoadCurve>(),
            entity.get::<EdgeGeometry>(),
            entity.get::<StartNodeGeometry>(),
            entity.get::<EndNodeGeometry>(),
            entity.get::<RoadComposition>(),
        ) else {
            panic!("{parcel} {node:?} road {road} has no geometry");
        };
        let view = RoadView {
            curve: &curve.0,
            edge,
            start: &start.0,
            end: &end.0,
            composition,
        };

        let params = world.resource::<ParcelRoadParams>();
        let Some(transform) = world.get::<ParcelTransform>(parcel) else {
            panic!("{parcel} has no transform");
        };
        let point = transform.access_point(self.parcel(parcel).lot_size, node);
        let reach = params.side_radius + 1e-3;
        assert!(
            road_distance(&view, point, reach, params.side_can_be_on_road).is_some(),
            "{parcel} {node:?} road {road} is out of reach of {point:?}"
        );
    }
}
