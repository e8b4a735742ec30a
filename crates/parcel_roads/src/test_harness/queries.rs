//! Query and tick methods for `TestWorld`.

use bevy::ecs::event::Events;
use bevy::prelude::*;

use crate::connection::{ParcelConnectionChanged, RoadConnectionStats};
use crate::icons::{IconChanged, WarningIconKind, WarningIcons};
use crate::parcel::{Parcel, ParcelFlags};
use crate::road::ConnectedParcels;
use crate::spatial::{ParcelSearchTree, RoadSearchTree};
use crate::state_hash::ConnectionStateHash;

use super::TestWorld;

impl TestWorld {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N resolver cycles by directly executing the `FixedUpdate`
    /// schedule. This bypasses Bevy's time system entirely, so every call
    /// runs exactly N cycles.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    // -----------------------------------------------------------------------
    // Parcels
    // -----------------------------------------------------------------------

    pub fn parcel(&self, parcel: Entity) -> &Parcel {
        self.app
            .world()
            .get::<Parcel>(parcel)
            .unwrap_or_else(|| panic!("{parcel} has no Parcel component"))
    }

    pub fn front_road(&self, parcel: Entity) -> Option<Entity> {
        self.parcel(parcel).road_edge
    }

    pub fn left_road(&self, parcel: Entity) -> Option<Entity> {
        self.parcel(parcel).left_road
    }

    pub fn right_road(&self, parcel: Entity) -> Option<Entity> {
        self.parcel(parcel).right_road
    }

    pub fn curve_position(&self, parcel: Entity) -> f32 {
        self.parcel(parcel).curve_position
    }

    pub fn parcel_flags(&self, parcel: Entity) -> ParcelFlags {
        self.parcel(parcel).flags
    }

    /// Every live parcel with its data, ascending by entity.
    pub fn parcels(&mut self) -> Vec<(Entity, Parcel)> {
        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &Parcel)>();
        let mut parcels: Vec<_> = query
            .iter(world)
            .map(|(entity, parcel)| (entity, parcel.clone()))
            .collect();
        parcels.sort_unstable_by_key(|(entity, _)| *entity);
        parcels
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.app.world().get_entity(entity).is_ok()
    }

    // -----------------------------------------------------------------------
    // Roads
    // -----------------------------------------------------------------------

    /// The road's connected-parcels buffer in stored order.
    pub fn connected_parcels(&self, road: Entity) -> Vec<Entity> {
        self.app
            .world()
            .get::<ConnectedParcels>(road)
            .map(|connected| connected.0.clone())
            .unwrap_or_default()
    }

    /// Every live road with its buffer, ascending by entity.
    pub fn road_buffers(&mut self) -> Vec<(Entity, Vec<Entity>)> {
        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &ConnectedParcels)>();
        let mut roads: Vec<_> = query
            .iter(world)
            .map(|(entity, connected)| (entity, connected.0.clone()))
            .collect();
        roads.sort_unstable_by_key(|(entity, _)| *entity);
        roads
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn icons(&self) -> &WarningIcons {
        self.app.world().resource::<WarningIcons>()
    }

    pub fn has_no_road_icon(&self, parcel: Entity) -> bool {
        self.icons().contains(parcel, WarningIconKind::NoRoadAccess)
    }

    pub fn stats(&self) -> &RoadConnectionStats {
        self.app.world().resource::<RoadConnectionStats>()
    }

    pub fn state_hash(&self) -> u64 {
        self.app.world().resource::<ConnectionStateHash>().hash
    }

    pub fn road_tree(&self) -> &RoadSearchTree {
        self.app.world().resource::<RoadSearchTree>()
    }

    pub fn parcel_tree(&self) -> &ParcelSearchTree {
        self.app.world().resource::<ParcelSearchTree>()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Take every `ParcelConnectionChanged` sent since the last drain.
    pub fn drain_connection_changes(&mut self) -> Vec<ParcelConnectionChanged> {
        self.app
            .world_mut()
            .resource_mut::<Events<ParcelConnectionChanged>>()
            .drain()
            .collect()
    }

    /// Take every `IconChanged` sent since the last drain.
    pub fn drain_icon_changes(&mut self) -> Vec<IconChanged> {
        self.app
            .world_mut()
            .resource_mut::<Events<IconChanged>>()
            .drain()
            .collect()
    }
}
