use bevy::prelude::*;
use bitflags::bitflags;

use crate::parcel_geometry::{access_position, parcel_bounds_xz, AccessNode};

bitflags! {
    /// Structural road-presence flags on a parcel, one per resolved access side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParcelFlags: u8 {
        const ROAD_FRONT = 1 << 0;
        const ROAD_LEFT = 1 << 1;
        const ROAD_RIGHT = 1 << 2;
    }
}

impl ParcelFlags {
    /// Presence flags for the given front, left and right roads.
    pub fn from_roads(front: Option<Entity>, left: Option<Entity>, right: Option<Entity>) -> Self {
        let mut flags = ParcelFlags::empty();
        flags.set(ParcelFlags::ROAD_FRONT, front.is_some());
        flags.set(ParcelFlags::ROAD_LEFT, left.is_some());
        flags.set(ParcelFlags::ROAD_RIGHT, right.is_some());
        flags
    }
}

/// A rectangular buildable lot that wants a road connection.
///
/// `road_edge` is the front road and is mirrored in that road's
/// [`crate::road::ConnectedParcels`] list. Side roads are informational and
/// are not listed on the road.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Width x depth in lot cells.
    pub lot_size: UVec2,
    /// Road edge serving the front access point.
    pub road_edge: Option<Entity>,
    /// Parameter along the front road's curve where the parcel attaches.
    pub curve_position: f32,
    /// Road edge closest to the left access point, if any.
    pub left_road: Option<Entity>,
    /// Road edge closest to the right access point, if any.
    pub right_road: Option<Entity>,
    pub flags: ParcelFlags,
}

impl Parcel {
    pub fn new(lot_size: UVec2) -> Self {
        Self {
            lot_size,
            road_edge: None,
            curve_position: 0.0,
            left_road: None,
            right_road: None,
            flags: ParcelFlags::empty(),
        }
    }

    /// Flags implied by the current road references.
    pub fn derived_flags(&self) -> ParcelFlags {
        ParcelFlags::from_roads(self.road_edge, self.left_road, self.right_road)
    }

    /// Forget every reference to `road`. Returns true if anything changed.
    pub fn detach_road(&mut self, road: Entity) -> bool {
        let mut changed = false;
        if self.road_edge == Some(road) {
            self.road_edge = None;
            self.curve_position = 0.0;
            changed = true;
        }
        if self.left_road == Some(road) {
            self.left_road = None;
            changed = true;
        }
        if self.right_road == Some(road) {
            self.right_road = None;
            changed = true;
        }
        if changed {
            self.flags = self.derived_flags();
        }
        changed
    }
}

/// World placement of a parcel.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ParcelTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for ParcelTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ParcelTransform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// World position of `node` for a lot of `lot_size` placed here.
    pub fn access_point(&self, lot_size: UVec2, node: AccessNode) -> Vec3 {
        access_position(self.position, self.rotation, lot_size, node)
    }

    /// X-Z footprint bounds for a lot of `lot_size` placed here.
    pub fn bounds_xz(&self, lot_size: UVec2) -> Rect {
        parcel_bounds_xz(self.position, self.rotation, lot_size)
    }
}

#[derive(Bundle)]
pub struct ParcelBundle {
    pub parcel: Parcel,
    pub transform: ParcelTransform,
}

impl ParcelBundle {
    pub fn new(lot_size: UVec2, transform: ParcelTransform) -> Self {
        Self {
            parcel: Parcel::new(lot_size),
            transform,
        }
    }
}
