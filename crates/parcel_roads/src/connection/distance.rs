//! Distance from a point to a road edge's boundary geometry.
//!
//! Every check takes the running maximum by `&mut` and only ever lowers it,
//! and every part is rejected up front when its bounds are already further
//! away than the current maximum.

use bevy::prelude::*;

use crate::curve::{distance_to_segment, rect_distance_sq, xz, Bezier4, RoadSide};
use crate::road::{CompositionFlags, EdgeGeometry, NodeGeometry, RoadComposition, Segment};

/// Borrowed view of the components the resolver reads from a road edge.
#[derive(Debug, Clone, Copy)]
pub struct RoadView<'a> {
    pub curve: &'a Bezier4,
    pub edge: &'a EdgeGeometry,
    pub start: &'a NodeGeometry,
    pub end: &'a NodeGeometry,
    pub composition: &'a RoadComposition,
}

impl RoadView<'_> {
    /// Whether the edge as a whole may take parcel connections.
    pub fn is_at_grade(&self) -> bool {
        !self
            .composition
            .general
            .intersects(CompositionFlags::BLOCKS_EDGE)
    }

    /// Composition flags of the side `side` of the road.
    pub fn side_flags(&self, side: RoadSide) -> CompositionFlags {
        match side {
            RoadSide::Left => self.composition.left,
            RoadSide::Right => self.composition.right,
        }
    }
}

#[inline]
fn within(bounds: Rect, position: Vec3, max: f32) -> bool {
    rect_distance_sq(bounds, xz(position)) < max * max
}

fn check_curve(curve: &Bezier4, position: Vec3, max: &mut f32) {
    if within(curve.bounds_xz(), position, *max) {
        let (distance, _) = curve.distance_xz(position);
        *max = max.min(distance);
    }
}

/// Distance to the surface between two roughly parallel curves.
fn check_between(left: &Bezier4, right: &Bezier4, position: Vec3, max: &mut f32) {
    let bounds = left.bounds_xz().union(right.bounds_xz());
    if !within(bounds, position, *max) {
        return;
    }
    let t = left.lerp(right, 0.5).nearest_parameter(position);
    let distance = distance_to_segment(left.position(t), right.position(t), position);
    *max = max.min(distance);
}

fn check_segment(segment: &Segment, position: Vec3, max: &mut f32) {
    check_curve(&segment.left, position, max);
    check_curve(&segment.right, position, max);
}

fn check_node(node: &NodeGeometry, position: Vec3, can_be_on_road: bool, max: &mut f32) {
    if !within(node.bounds, position, *max) {
        return;
    }
    check_curve(&node.left.left, position, max);
    check_curve(&node.right.right, position, max);
    if node.middle_radius > 0.0 {
        check_curve(&node.left.right, position, max);
        check_curve(&node.right.left, position, max);
    }
    if can_be_on_road {
        if node.middle_radius > 0.0 {
            check_between(&node.left.left, &node.left.right, position, max);
            check_between(&node.right.left, &node.middle, position, max);
            check_between(&node.middle, &node.right.right, position, max);
        } else {
            check_between(&node.left.left, &node.right.right, position, max);
        }
    }
}

/// Tighten `max` to the distance from `position` to the road's edge and node
/// geometry. With `can_be_on_road` a position on the road surface counts as
/// distance zero instead of the distance to the nearest boundary.
pub fn check_distance(
    edge: &EdgeGeometry,
    start: &NodeGeometry,
    end: &NodeGeometry,
    position: Vec3,
    can_be_on_road: bool,
    max: &mut f32,
) {
    if within(edge.bounds, position, *max) {
        check_segment(&edge.start, position, max);
        check_segment(&edge.end, position, max);
        if can_be_on_road {
            check_between(&edge.start.left, &edge.start.right, position, max);
            check_between(&edge.end.left, &edge.end.right, position, max);
        }
    }
    check_node(start, position, can_be_on_road, max);
    check_node(end, position, can_be_on_road, max);
}

/// Distance from `position` to `road` if it is at grade and strictly closer
/// than `max`.
pub fn road_distance(
    road: &RoadView<'_>,
    position: Vec3,
    max: f32,
    can_be_on_road: bool,
) -> Option<f32> {
    if !road.is_at_grade() {
        return None;
    }
    let mut distance = max;
    check_distance(road.edge, road.start, road.end, position, can_be_on_road, &mut distance);
    (distance < max).then_some(distance)
}
