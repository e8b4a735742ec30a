//! Parcel footprint and access-node geometry.
//!
//! A parcel is a rectangle of `width x depth` lot cells. Its local frame has
//! +Z pointing out of the front edge and +X out of the left edge (the lot is
//! viewed from the road, so "left" is mirrored against the usual handedness).
//! Local offsets are always applied as scale, then rotate, then translate.

use bevy::prelude::*;

use crate::config::{CELL_SIZE, PARCEL_HEIGHT};

/// Named points on a parcel's boundary used as anchors for road queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessNode {
    Center,
    FrontAccess,
    BackAccess,
    LeftAccess,
    RightAccess,
    FrontLeftCorner,
    FrontRightCorner,
    BackLeftCorner,
    BackRightCorner,
}

/// World-space extent of a parcel with the given lot size.
pub fn parcel_size(lot_size: UVec2) -> Vec3 {
    Vec3::new(
        lot_size.x as f32 * CELL_SIZE,
        PARCEL_HEIGHT,
        lot_size.y as f32 * CELL_SIZE,
    )
}

/// Offset of an access node as a fraction of the parcel size, each component
/// in [-0.5, 0.5]. `Center` maps to the origin.
pub fn access_node_offset(node: AccessNode) -> Vec3 {
    match node {
        AccessNode::Center => Vec3::ZERO,
        AccessNode::FrontAccess => Vec3::new(0.0, 0.0, 0.5),
        AccessNode::BackAccess => Vec3::new(0.0, 0.0, -0.5),
        AccessNode::LeftAccess => Vec3::new(0.5, 0.0, 0.0),
        AccessNode::RightAccess => Vec3::new(-0.5, 0.0, 0.0),
        AccessNode::FrontLeftCorner => Vec3::new(0.5, 0.0, 0.5),
        AccessNode::FrontRightCorner => Vec3::new(-0.5, 0.0, 0.5),
        AccessNode::BackLeftCorner => Vec3::new(0.5, 0.0, -0.5),
        AccessNode::BackRightCorner => Vec3::new(-0.5, 0.0, -0.5),
    }
}

/// Transform a local offset into world space: rotate, then translate.
pub fn world_position(position: Vec3, rotation: Quat, local: Vec3) -> Vec3 {
    rotation * local + position
}

/// World position of an access node for a parcel placed at
/// `position`/`rotation`.
pub fn access_position(position: Vec3, rotation: Quat, lot_size: UVec2, node: AccessNode) -> Vec3 {
    let local = access_node_offset(node) * parcel_size(lot_size);
    world_position(position, rotation, local)
}

/// Footprint corners in the order right-front, left-front, left-back,
/// right-back.
pub fn world_corners(rotation: Quat, position: Vec3, lot_size: UVec2) -> [Vec3; 4] {
    [
        AccessNode::FrontRightCorner,
        AccessNode::FrontLeftCorner,
        AccessNode::BackLeftCorner,
        AccessNode::BackRightCorner,
    ]
    .map(|node| access_position(position, rotation, lot_size, node))
}

/// Axis-aligned X-Z bounds of the parcel footprint.
pub fn parcel_bounds_xz(position: Vec3, rotation: Quat, lot_size: UVec2) -> Rect {
    let corners = world_corners(rotation, position, lot_size);
    let mut rect = Rect::from_center_size(Vec2::new(position.x, position.z), Vec2::ZERO);
    for corner in corners {
        rect = rect.union_point(Vec2::new(corner.x, corner.z));
    }
    rect
}
