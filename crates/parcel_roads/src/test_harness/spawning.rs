//! Entity spawning and editing helpers for integration tests.
//!
//! Every helper tags the touched entity with the lifecycle marker a host
//! would, so the next `tick()` picks the change up.

use bevy::prelude::*;

use crate::lifecycle::{Created, Deleted, Temp, TempFlags, Updated};
use crate::parcel::{ParcelBundle, ParcelTransform};
use crate::road::{
    CompositionFlags, EndNodeGeometry, RoadBundle, RoadComposition, RoadCurve, RoadGeometry,
    StartNodeGeometry,
};

use super::TestWorld;

/// Road half width used by the straight-road helpers.
pub const TEST_ROAD_HALF_WIDTH: f32 = 4.0;

impl TestWorld {
    // -----------------------------------------------------------------------
    // Roads
    // -----------------------------------------------------------------------

    /// Spawn an at-grade straight road from `from` to `to` (X-Z positions).
    pub fn spawn_road(&mut self, from: Vec2, to: Vec2) -> Entity {
        self.spawn_road_with(from, to, RoadComposition::default())
    }

    /// Spawn a straight road with an explicit composition.
    pub fn spawn_road_with(
        &mut self,
        from: Vec2,
        to: Vec2,
        composition: RoadComposition,
    ) -> Entity {
        let geometry = straight(from, to);
        self.spawn_road_geometry(geometry, composition)
    }

    /// Spawn a road edge from prebuilt geometry.
    pub fn spawn_road_geometry(
        &mut self,
        geometry: RoadGeometry,
        composition: RoadComposition,
    ) -> Entity {
        self.app
            .world_mut()
            .spawn((RoadBundle::new(geometry, composition), Created))
            .id()
    }

    /// Spawn an elevated road, which never takes parcel connections.
    pub fn spawn_elevated_road(&mut self, from: Vec2, to: Vec2) -> Entity {
        self.spawn_road_with(
            from,
            to,
            RoadComposition {
                general: CompositionFlags::ELEVATED,
                ..Default::default()
            },
        )
    }

    /// Replace a road's geometry and mark it updated.
    pub fn move_road(&mut self, road: Entity, from: Vec2, to: Vec2) {
        let geometry = straight(from, to);
        if let Ok(mut entity) = self.app.world_mut().get_entity_mut(road) {
            entity.insert((
                RoadCurve(geometry.curve),
                geometry.edge,
                StartNodeGeometry(geometry.start_node),
                EndNodeGeometry(geometry.end_node),
                Updated,
            ));
        }
    }

    /// Change a road's composition and mark it updated.
    pub fn set_road_composition(&mut self, road: Entity, composition: RoadComposition) {
        if let Ok(mut entity) = self.app.world_mut().get_entity_mut(road) {
            entity.insert((composition, Updated));
        }
    }

    // -----------------------------------------------------------------------
    // Parcels
    // -----------------------------------------------------------------------

    /// Spawn a parcel of `lot_size` cells at `position` with its front facing
    /// +Z.
    pub fn spawn_parcel(&mut self, lot_size: UVec2, position: Vec3) -> Entity {
        self.spawn_parcel_with(lot_size, ParcelTransform::from_position(position))
    }

    pub fn spawn_parcel_with(&mut self, lot_size: UVec2, transform: ParcelTransform) -> Entity {
        self.app
            .world_mut()
            .spawn((ParcelBundle::new(lot_size, transform), Created))
            .id()
    }

    /// Spawn a provisional parcel, as a placement preview would.
    pub fn spawn_temp_parcel(&mut self, lot_size: UVec2, position: Vec3) -> Entity {
        self.app
            .world_mut()
            .spawn((
                ParcelBundle::new(lot_size, ParcelTransform::from_position(position)),
                Temp::new(TempFlags::CREATE),
                Created,
            ))
            .id()
    }

    /// Move a parcel and mark it updated.
    pub fn move_parcel(&mut self, parcel: Entity, transform: ParcelTransform) {
        if let Ok(mut entity) = self.app.world_mut().get_entity_mut(parcel) {
            entity.insert((transform, Updated));
        }
    }

    /// Mark an entity updated without changing any data.
    pub fn touch(&mut self, entity: Entity) {
        if let Ok(mut entity) = self.app.world_mut().get_entity_mut(entity) {
            entity.insert(Updated);
        }
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Mark a road or parcel deleted. It is despawned at the end of the next
    /// tick.
    pub fn delete(&mut self, entity: Entity) {
        if let Ok(mut entity) = self.app.world_mut().get_entity_mut(entity) {
            entity.insert(Deleted);
        }
    }
}

fn straight(from: Vec2, to: Vec2) -> RoadGeometry {
    RoadGeometry::straight(
        Vec3::new(from.x, 0.0, from.y),
        Vec3::new(to.x, 0.0, to.y),
        TEST_ROAD_HALF_WIDTH,
    )
}
